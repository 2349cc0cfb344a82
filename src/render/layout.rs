use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions, top to bottom: title, file row, text filters, dropdowns,
/// the results/detail/chart body, the control bar and an optional debug row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub title: Rect,
    pub file: Rect,
    pub filters: Rect,
    pub dropdowns: Rect,
    pub results: Rect,
    pub detail: Rect,
    pub chart: Rect,
    pub control_bar: Rect,
    pub debug: Option<Rect>,
}

pub fn app_layout(area: Rect, debug_enabled: bool) -> AppLayout {
    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ];
    if debug_enabled {
        constraints.push(Constraint::Length(1));
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[4]);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Fill(1)])
        .split(body[1]);

    AppLayout {
        title: layout[0],
        file: layout[1],
        filters: layout[2],
        dropdowns: layout[3],
        results: body[0],
        detail: side[0],
        chart: side[1],
        control_bar: layout[5],
        debug: if debug_enabled { Some(layout[6]) } else { None },
    }
}

/// Split a row into `n` equal columns.
pub fn columns(area: Rect, n: usize) -> Vec<Rect> {
    let constraints = vec![Constraint::Ratio(1, n.max(1) as u32); n.max(1)];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}
