//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Navigation commands
    Dashboard,
    History,
    Help,

    // Wallet commands
    Connect,
    Refresh,
    Send { to: String, amount: String },

    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim().to_string());

    match cmd.to_lowercase().as_str() {
        // Navigation
        "dashboard" | "dash" | "home" => Command::Dashboard,
        "history" | "hist" | "txs" => Command::History,
        "help" | "h" => Command::Help,

        // Wallet
        "connect" | "conn" => Command::Connect,
        "refresh" | "balance" | "bal" => Command::Refresh,
        "send" | "transfer" => {
            let words: Vec<&str> = args
                .as_deref()
                .map(|s| s.split_whitespace().collect())
                .unwrap_or_default();
            match words.as_slice() {
                [to, amount] => Command::Send {
                    to: to.to_string(),
                    amount: amount.to_string(),
                },
                _ => Command::Unknown(input.to_string()),
            }
        }

        "quit" | "q" | "exit" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}
