use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

pub mod layout;
pub mod widgets;

use crate::app::{App, Focus, InputMode, StatusLevel, Tab};
use crate::domain::{short_address, HistoryView, TransferStatus, EMPTY_HISTORY_MESSAGE};
use crate::session::SessionStatus;
use widgets::MiniSparkline;

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    match app.current_tab {
        Tab::Dashboard => draw_dashboard(f, areas.main, app),
        Tab::History => draw_history(f, areas.main, app),
    }
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn status_color(status: &SessionStatus) -> Color {
    match status {
        SessionStatus::Connected => Color::LightGreen,
        SessionStatus::Connecting => Color::LightYellow,
        SessionStatus::Failed(_) => Color::LightRed,
        SessionStatus::Disconnected => Color::DarkGray,
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let mut spans = vec![
        Span::styled(
            "TrachyCoin",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    for tab in Tab::ALL {
        let style = if tab == app.current_tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(
            format!(" {} {} ", tab.shortcut(), tab.title()),
            style,
        ));
        spans.push(Span::raw(" "));
    }

    let left = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let state = app.state();
    let account = state
        .session
        .as_ref()
        .map(|s| short_address(&s.account()))
        .unwrap_or_else(|| "--".to_string());
    let chain = state
        .session
        .as_ref()
        .map(|s| s.chain_id().to_string())
        .unwrap_or_else(|| "--".to_string());
    let right_line = Line::from(vec![
        Span::styled(
            format!("{}  ", state.status.label()),
            Style::default().fg(status_color(&state.status)),
        ),
        label("Account "),
        Span::raw(format!("{}  ", account)),
        label("Chain "),
        Span::raw(chain),
    ]);
    let right = Paragraph::new(right_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let areas = layout::dashboard_areas(area);
    draw_balance_card(f, areas.balance, app);
    draw_alerts(f, areas.alerts, app);
    draw_price_card(f, areas.price, app);
    draw_transfer_form(f, areas.form, app);
}

fn draw_balance_card(f: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let lines = match state.session.as_ref() {
        Some(session) => {
            let symbol = session.metadata().symbol;
            vec![
                Line::from(Span::styled(
                    format!("{} {}", session.display_balance(), symbol),
                    Style::default()
                        .fg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![label("Wallet "), Span::raw(short_address(&session.account()))]),
                Line::from(vec![
                    label("Token  "),
                    Span::raw(
                        session
                            .contract()
                            .map(|c| short_address(&c.address))
                            .unwrap_or_else(|| "--".to_string()),
                    ),
                ]),
            ]
        }
        None => vec![
            Line::from(Span::styled("-- TRCHY", Style::default().fg(Color::DarkGray))),
            Line::from(label("Press c to connect your wallet")),
        ],
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Balance").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_alerts(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    if let Some(alert) = app.environment_alert() {
        lines.push(Line::from(Span::styled(
            alert,
            Style::default().fg(Color::LightRed),
        )));
    } else if let SessionStatus::Failed(err) = &app.state().status {
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::LightRed),
        )));
    }
    if let Some(warning) = app.deployer_warning() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            warning,
            Style::default().fg(Color::LightYellow),
        )));
    }

    let state = app.state();
    if let Some(latest) = state.history.latest() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        let color = if latest.is_success() {
            Color::LightGreen
        } else {
            Color::LightRed
        };
        lines.push(Line::from(vec![
            label("Last transfer "),
            Span::styled(latest.status.label(), Style::default().fg(color)),
            Span::raw(format!(" {} to {}", latest.amount, short_address(&latest.to))),
        ]));
    }
    if state.transfer_pending {
        lines.push(Line::from(Span::styled(
            "Waiting for confirmation…",
            Style::default().fg(Color::LightYellow),
        )));
    }
    if lines.is_empty() {
        lines.push(Line::from(label("All clear")));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Status").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_price_card(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Price").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let change = app.price.change_pct();
    let (arrow, color) = if change >= 0.0 {
        ("▲", Color::LightGreen)
    } else {
        ("▼", Color::LightRed)
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("${:.4}", app.price.current()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("{arrow} {:.2}%", change.abs()), Style::default().fg(color)),
        ]),
        Line::from(vec![label("EUR "), Span::raw(format!("€{:.4}", app.price.eur()))]),
    ];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);
    f.render_widget(Paragraph::new(Text::from(lines)), rows[0]);

    let series = app.price.sparkline();
    f.render_widget(
        MiniSparkline::new(&series).style(Style::default().fg(color)),
        rows[1],
    );
}

fn draw_transfer_form(f: &mut Frame, area: Rect, app: &App) {
    let focused = |focus: Focus| app.focus == focus && app.current_tab == Tab::Dashboard;
    let editing = |focus: Focus| app.input_mode == InputMode::Editing(focus);

    let field = |name: &'static str, value: &str, focus: Focus| -> Line<'static> {
        let marker = if focused(focus) { "> " } else { "  " };
        let value_style = if editing(focus) {
            Style::default().fg(Color::Yellow)
        } else if focused(focus) {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let cursor = if editing(focus) { "_" } else { "" };
        Line::from(vec![
            Span::raw(marker),
            label(name),
            Span::styled(format!("{value}{cursor}"), value_style),
        ])
    };

    let submit_style = if app.state().transfer_pending {
        Style::default().fg(Color::DarkGray)
    } else if focused(Focus::Submit) {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let submit_label = if app.state().transfer_pending {
        "[ Sending… ]"
    } else {
        "[ Send ]"
    };

    let lines = vec![
        field("To      ", &app.form.recipient, Focus::Recipient),
        field("Amount  ", &app.form.amount, Focus::Amount),
        Line::from(""),
        Line::from(vec![Span::raw("  "), Span::styled(submit_label, submit_style)]),
    ];

    let border_style = if matches!(app.input_mode, InputMode::Editing(_)) {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title("Transfer")
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(paragraph, area);
}

fn draw_history(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("History").borders(Borders::ALL);
    let rows = match app.history_view() {
        HistoryView::Empty => {
            let paragraph = Paragraph::new(EMPTY_HISTORY_MESSAGE)
                .block(block)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, area);
            return;
        }
        HistoryView::Rows(rows) => rows,
    };

    let header = Row::new(vec!["Time", "From", "To", "Amount", "Status"])
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));
    let body = rows.into_iter().skip(app.history_offset).map(|row| {
        let color = match row.status {
            TransferStatus::Success => Color::LightGreen,
            TransferStatus::Failed => Color::LightRed,
        };
        Row::new(vec![
            Cell::from(row.time),
            Cell::from(row.from),
            Cell::from(row.to),
            Cell::from(row.amount),
            Cell::from(row.status.label()).style(Style::default().fg(color)),
        ])
    });

    let widths = [
        Constraint::Length(20),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Min(12),
        Constraint::Length(8),
    ];
    let table = Table::new(body, widths).header(header).block(block);
    f.render_widget(table, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let mut spans = vec![
        label("RPC "),
        Span::raw(format!("{}  ", app.endpoint)),
        label("Session "),
        Span::styled(
            format!("{}  ", state.status.label()),
            Style::default().fg(status_color(&state.status)),
        ),
        label("Transfers "),
        Span::raw(state.history.len().to_string()),
    ];
    if state.transfer_pending {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("pending", Style::default().fg(Color::LightYellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("dashboard", "Show balance, price and transfer form"),
        ("history", "Show transfer history"),
        ("connect", "Connect wallet"),
        ("refresh", "Re-read token balance"),
        ("send", "send <to> <amount>"),
        ("help", "Show key bindings"),
        ("quit", "Exit"),
    ];

    let head = input.split_whitespace().next().unwrap_or_default();
    for (cmd, desc) in commands {
        if cmd.starts_with(head) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("connect | refresh | send <to> <amount> | history");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.as_str()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Editing(focus) => {
            let name = match focus {
                Focus::Recipient => "recipient",
                Focus::Amount => "amount",
                Focus::Submit => "submit",
            };
            Line::from(vec![
                Span::styled(format!("> {name} "), Style::default().fg(Color::LightCyan)),
                Span::styled(
                    "(Enter=next Esc=done)",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(64, 60, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  1 / 2      Dashboard / History"),
        Line::from("  Tab        Next tab"),
        Line::from("  j / k      Move focus (Dashboard) or scroll (History)"),
        Line::from("  Enter      Edit field / send"),
        Line::from("  Esc        Stop editing / close"),
        Line::from(""),
        Line::from("Actions"),
        Line::from("  c          Connect wallet"),
        Line::from("  r          Refresh balance"),
        Line::from("  :          Command line"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :send 0x<40-hex-address> 1.5"),
        Line::from("  :connect  :refresh  :history  :dashboard"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn action_hints(app: &App) -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::LightCyan));
    let mut spans = vec![
        key("1-2"),
        Span::raw(" Tab  "),
        key("c"),
        Span::raw(" Connect  "),
        key("r"),
        Span::raw(" Refresh  "),
    ];
    match app.current_tab {
        Tab::Dashboard => spans.extend([
            key("j/k"),
            Span::raw(" Focus  "),
            key("Enter"),
            Span::raw(" Edit/Send  "),
        ]),
        Tab::History => spans.extend([key("j/k"), Span::raw(" Scroll  ")]),
    }
    spans.extend([
        key(":"),
        Span::raw(" Command  "),
        key("?"),
        Span::raw(" Help  "),
        key("q"),
        Span::raw(" Quit"),
    ]);
    Line::from(spans)
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
