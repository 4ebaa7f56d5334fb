use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde_json::json;

use trachy::app::{App, InputMode, Tab};
use trachy::config::{self, Config};
use trachy::infrastructure::ethereum::{connect_wallet, ProviderConfig, WalletProvider};
use trachy::infrastructure::logging::{self, LogTarget};
use trachy::infrastructure::runtime::{RuntimeBridge, RuntimeCommand};
use trachy::session::SessionClient;
use trachy::ui;

#[derive(Debug, Parser)]
#[command(
    name = "trachy",
    version,
    about = "Trachy: a TrachyCoin wallet dashboard for the local dev chain"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long, global = true)]
    ws: Option<String>,

    /// Seed for the simulated price series
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (defaults to ~/.config/trachy/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Connect and print the session as JSON
    Status,
    /// Send TrachyCoin and print the transfer record as JSON
    Transfer {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Decimal amount, e.g. 1.5
        #[arg(long)]
        amount: String,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };
    let endpoint = endpoint_from_args_and_config(&args, &config);

    match args.command {
        Some(command) => {
            logging::init(&config.logging.level, LogTarget::Stderr)?;
            run_headless(command, endpoint, &config)
        }
        None => {
            if let Some(path) = config.log_path() {
                logging::init(&config.logging.level, LogTarget::File(path))?;
            }
            run_tui(args.seed, endpoint, &config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn endpoint_from_args_and_config(args: &Args, config: &Config) -> ProviderConfig {
    if let Some(ws) = args.ws.as_ref().filter(|s| !s.trim().is_empty()) {
        return ProviderConfig::WebSocket(ws.trim().to_string());
    }
    if let Some(rpc) = args.rpc.as_ref().filter(|s| !s.trim().is_empty()) {
        return ProviderConfig::Http(normalize_http_endpoint(rpc));
    }
    match config.provider_config() {
        ProviderConfig::Http(url) => ProviderConfig::Http(normalize_http_endpoint(&url)),
        other => other,
    }
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn run_headless(command: CliCommand, endpoint: ProviderConfig, config: &Config) -> Result<ExitCode> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    rt.block_on(headless(command, endpoint, config))
}

async fn headless(command: CliCommand, endpoint: ProviderConfig, config: &Config) -> Result<ExitCode> {
    let provider: Option<Arc<dyn WalletProvider>> =
        match connect_wallet(&endpoint, &config.wallet.options()).await {
            Ok(wallet) => Some(Arc::new(wallet)),
            Err(err) => {
                tracing::error!(endpoint = %endpoint.display(), error = %err, "wallet unavailable");
                None
            }
        };
    let mut client = SessionClient::new(provider);

    let session = match client.connect().await {
        Ok(session) => session,
        Err(err) => {
            print_json(&json!({ "status": "failed", "error": err }))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    match command {
        CliCommand::Status => {
            print_json(&json!({ "status": "connected", "session": session.as_ref() }))?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Transfer { to, amount } => match client.transfer(&to, &amount).await {
            Ok(record) => {
                print_json(&record)?;
                Ok(if record.is_success() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Err(err) => {
                print_json(&json!({ "error": err }))?;
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{text}");
    Ok(())
}

fn run_tui(seed: Option<u64>, endpoint: ProviderConfig, config: &Config) -> Result<()> {
    let seed = seed
        .or(config.price.seed)
        .unwrap_or_else(rand::random::<u64>);
    let endpoint_display = endpoint.display();

    let runtime = RuntimeBridge::new(endpoint, config.wallet.options())?;
    let mut app = App::new(seed, config.price_tick(), endpoint_display);
    app.request_connect();

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime)?;
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) -> Result<()> {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }

    if app.take_connect_request() {
        runtime.send(RuntimeCommand::Connect)?;
    }
    if app.take_refresh_request() {
        runtime.send(RuntimeCommand::RefreshBalance)?;
    }
    if let Some((to, amount)) = app.take_transfer_request() {
        runtime.send(RuntimeCommand::Transfer { to, amount })?;
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
        InputMode::Editing(_) => handle_edit_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char(':') => app.enter_command(),
        KeyCode::Char('c') => app.request_connect(),
        KeyCode::Char('r') => app.request_refresh(),
        KeyCode::Char('1') => app.set_tab(Tab::Dashboard),
        KeyCode::Char('2') => app.set_tab(Tab::History),
        KeyCode::Tab => app.next_tab(),
        KeyCode::Char('j') | KeyCode::Down => match app.current_tab {
            Tab::Dashboard => app.move_focus(true),
            Tab::History => app.scroll_history(true),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.current_tab {
            Tab::Dashboard => app.move_focus(false),
            Tab::History => app.scroll_history(false),
        },
        KeyCode::Enter if app.current_tab == Tab::Dashboard => app.activate_focus(),
        _ => {}
    }
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_edit(),
        KeyCode::Enter | KeyCode::Tab => app.commit_edit(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.push_char(ch);
        }
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}
