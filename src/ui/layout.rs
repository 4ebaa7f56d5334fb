use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub main: Rect,
    pub footer: Rect,
    pub status_line: Rect,
    pub command_line: Rect,
}

/// Panels of the Dashboard tab
#[derive(Debug, Clone, Copy)]
pub struct DashboardAreas {
    pub balance: Rect,
    pub alerts: Rect,
    pub price: Rect,
    pub form: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[2]);

    UiAreas {
        size,
        header: vertical[0],
        main: vertical[1],
        footer: vertical[2],
        status_line: footer_chunks[0],
        command_line: footer_chunks[1],
    }
}

pub fn dashboard_areas(main: Rect) -> DashboardAreas {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(columns[1]);

    DashboardAreas {
        balance: left[0],
        alerts: left[1],
        price: right[0],
        form: right[1],
    }
}
