use std::time::{Duration, Instant};

use crate::core::{parse_command, Action, Command, NotifyLevel};
use crate::domain::{short_address, HistoryView, PriceFeed, DEPLOYER_ADDRESS};
use crate::infrastructure::runtime::RuntimeEvent;
use crate::session::{ConnectError, SessionStatus};
use crate::store::{notification_for, DashboardState, Store};

pub type StatusLevel = NotifyLevel;

/// Main tabs in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    History,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Dashboard, Tab::History];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::History => "History",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            Tab::Dashboard => '1',
            Tab::History => '2',
        }
    }
}

/// Focusable element of the transfer form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Recipient,
    Amount,
    Submit,
}

impl Focus {
    const ORDER: [Focus; 3] = [Focus::Recipient, Focus::Amount, Focus::Submit];

    fn step(self, forward: bool) -> Focus {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::ORDER.len();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        Self::ORDER[next]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Editing(Focus),
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransferForm {
    pub recipient: String,
    pub amount: String,
}

impl TransferForm {
    pub fn clear(&mut self) {
        self.recipient.clear();
        self.amount.clear();
    }

    fn field_mut(&mut self, focus: Focus) -> Option<&mut String> {
        match focus {
            Focus::Recipient => Some(&mut self.recipient),
            Focus::Amount => Some(&mut self.amount),
            Focus::Submit => None,
        }
    }
}

#[derive(Debug)]
pub struct App {
    /// Current active tab
    pub current_tab: Tab,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub store: Store,
    pub price: PriceFeed,
    pub form: TransferForm,
    pub command: CommandBar,
    pub status: Option<StatusMessage>,
    pub endpoint: String,
    pub history_offset: usize,
    pub help_open: bool,
    pub should_quit: bool,
    price_seed: u64,
    price_tick: Duration,
    last_price_tick: Instant,
    pending_connect: bool,
    pending_refresh: bool,
    pending_transfer: Option<(String, String)>,
}

impl App {
    pub fn new(price_seed: u64, price_tick: Duration, endpoint: impl Into<String>) -> Self {
        Self {
            current_tab: Tab::Dashboard,
            focus: Focus::Recipient,
            input_mode: InputMode::Normal,
            store: Store::new(),
            price: PriceFeed::new(price_seed),
            form: TransferForm::default(),
            command: CommandBar::default(),
            status: None,
            endpoint: endpoint.into(),
            history_offset: 0,
            help_open: false,
            should_quit: false,
            price_seed,
            price_tick,
            last_price_tick: Instant::now(),
            pending_connect: false,
            pending_refresh: false,
            pending_transfer: None,
        }
    }

    pub fn state(&self) -> &DashboardState {
        self.store.state()
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            // Errors stay up longer than routine messages.
            let ttl = match status.level {
                NotifyLevel::Error => Duration::from_secs(8),
                _ => Duration::from_secs(4),
            };
            if status.since.elapsed() > ttl {
                self.status = None;
            }
        }
        if self.last_price_tick.elapsed() >= self.price_tick {
            self.price.tick();
            self.last_price_tick = Instant::now();
        }
    }

    /// Fold a worker event into the store and surface it to the user.
    pub fn apply_event(&mut self, event: RuntimeEvent) {
        if let Some(note) = notification_for(&event) {
            self.set_status(note.message, note.level);
        }

        match &event {
            RuntimeEvent::TransferRecorded { record } if record.is_success() => {
                self.form.clear();
                self.focus = Focus::Recipient;
            }
            RuntimeEvent::EnvironmentReset => {
                self.price = PriceFeed::new(self.price_seed);
                self.last_price_tick = Instant::now();
                self.form.clear();
                self.history_offset = 0;
                self.pending_transfer = None;
                if let InputMode::Editing(_) = self.input_mode {
                    self.input_mode = InputMode::Normal;
                }
            }
            _ => {}
        }

        self.store.dispatch(&event);
        self.clamp_history_offset();
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
    }

    pub fn next_tab(&mut self) {
        let idx = Tab::ALL
            .iter()
            .position(|tab| *tab == self.current_tab)
            .unwrap_or(0);
        self.current_tab = Tab::ALL[(idx + 1) % Tab::ALL.len()];
    }

    pub fn move_focus(&mut self, forward: bool) {
        self.focus = self.focus.step(forward);
    }

    pub fn scroll_history(&mut self, down: bool) {
        if down {
            self.history_offset = self.history_offset.saturating_add(1);
        } else {
            self.history_offset = self.history_offset.saturating_sub(1);
        }
        self.clamp_history_offset();
    }

    fn clamp_history_offset(&mut self) {
        let len = self.state().history.len();
        self.history_offset = self.history_offset.min(len.saturating_sub(1));
    }

    /// Enter on the form: edit a field or submit.
    pub fn activate_focus(&mut self) {
        match self.focus {
            Focus::Recipient | Focus::Amount => self.input_mode = InputMode::Editing(self.focus),
            Focus::Submit => self.submit_form(),
        }
    }

    pub fn exit_edit(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Enter inside a field: move on to the next element.
    pub fn commit_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.move_focus(true);
        if self.focus != Focus::Submit {
            self.input_mode = InputMode::Editing(self.focus);
        }
    }

    pub fn push_char(&mut self, ch: char) {
        if let InputMode::Editing(focus) = self.input_mode {
            if let Some(field) = self.form.field_mut(focus) {
                field.push(ch);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let InputMode::Editing(focus) = self.input_mode {
            if let Some(field) = self.form.field_mut(focus) {
                field.pop();
            }
        }
    }

    pub fn submit_form(&mut self) {
        let to = self.form.recipient.clone();
        let amount = self.form.amount.clone();
        self.request_transfer(to, amount);
    }

    pub fn request_connect(&mut self) {
        if self.state().status == SessionStatus::Connecting {
            self.set_status("Already connecting…", StatusLevel::Warn);
            return;
        }
        self.pending_connect = true;
    }

    pub fn request_refresh(&mut self) {
        if !self.state().is_connected() {
            self.set_status("Connect a wallet first (press c)", StatusLevel::Warn);
            return;
        }
        self.pending_refresh = true;
        self.set_status("Refreshing balance…", StatusLevel::Info);
    }

    /// Queue a transfer after the same empty-field check the client makes.
    pub fn request_transfer(&mut self, to: String, amount: String) {
        if to.trim().is_empty() || amount.trim().is_empty() {
            self.set_status("Please fill in recipient and amount", StatusLevel::Warn);
            return;
        }
        if !self.state().is_connected() {
            self.set_status("Connect a wallet first (press c)", StatusLevel::Warn);
            return;
        }
        if !self.store.begin_transfer() {
            self.set_status("A transfer is already in progress", StatusLevel::Warn);
            return;
        }
        self.set_status("Submitting transfer…", StatusLevel::Info);
        self.pending_transfer = Some((to.trim().to_string(), amount.trim().to_string()));
    }

    pub fn take_connect_request(&mut self) -> bool {
        std::mem::take(&mut self.pending_connect)
    }

    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.pending_refresh)
    }

    pub fn take_transfer_request(&mut self) -> Option<(String, String)> {
        self.pending_transfer.take()
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }

        let cmd = parse_command(&input);
        self.exit_command();
        if let Command::Unknown(raw) = &cmd {
            self.set_status(format!("Unknown command: {raw}"), StatusLevel::Warn);
            return;
        }
        self.command.last = Some(input);
        let action = self.execute_command(&cmd);
        self.apply_action(action);
    }

    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Dashboard => {
                self.set_tab(Tab::Dashboard);
                Action::None
            }
            Command::History => {
                self.set_tab(Tab::History);
                Action::None
            }
            Command::Help => {
                self.help_open = true;
                Action::None
            }
            Command::Connect => Action::Connect,
            Command::Refresh => Action::RefreshBalance,
            Command::Send { to, amount } => Action::Transfer {
                to: to.clone(),
                amount: amount.clone(),
            },
            Command::Quit => Action::Quit,
            Command::Unknown(_) => Action::None,
        }
    }

    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Connect => self.request_connect(),
            Action::RefreshBalance => self.request_refresh(),
            Action::Transfer { to, amount } => self.request_transfer(to, amount),
            Action::Quit => self.should_quit = true,
        }
    }

    pub fn history_view(&self) -> HistoryView {
        let symbol = self
            .state()
            .session
            .as_ref()
            .map(|s| s.metadata().symbol)
            .unwrap_or_else(|| crate::domain::token::DEFAULT_TOKEN_SYMBOL.to_string());
        HistoryView::build(&self.state().history, &symbol)
    }

    /// Blocking problem with the environment, if any.
    pub fn environment_alert(&self) -> Option<String> {
        match &self.state().status {
            SessionStatus::Failed(ConnectError::WrongNetwork { expected, actual }) => Some(format!(
                "Wrong network: switch your wallet to chain {} (currently {})",
                expected, actual
            )),
            SessionStatus::Failed(ConnectError::NotDeployed { address }) => Some(format!(
                "TrachyCoin is not deployed at {}. Deploy the contract to the local node first.",
                address
            )),
            SessionStatus::Failed(ConnectError::NoProvider) => {
                Some("No wallet provider. Start a local node or pass --rpc.".to_string())
            }
            _ => None,
        }
    }

    /// Warning shown when the session account did not receive the initial supply.
    pub fn deployer_warning(&self) -> Option<String> {
        let session = self.state().session.as_ref()?;
        if session.account() == DEPLOYER_ADDRESS {
            return None;
        }
        Some(format!(
            "Connected as {}. The initial supply belongs to the deployer {} (Hardhat account #0).",
            short_address(&session.account()),
            short_address(&DEPLOYER_ADDRESS)
        ))
    }
}
