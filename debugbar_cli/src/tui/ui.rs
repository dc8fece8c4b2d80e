//! TUI rendering functions

use super::app::{Focus, TuiApp};
use crate::toolbar::{Column, FeedStatus, SwitchState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, TableState, Wrap,
    },
    Frame,
};

const HANDLE_LABEL: &str = " ◀ pDebug ";

/// Draw the TUI
pub fn draw(frame: &mut Frame, app: &TuiApp) {
    if app.panels.is_toolbar_visible() {
        draw_toolbar(frame, app);
    } else {
        draw_handle(frame, frame.area());
    }
}

/// Where the minimised toolbar handle sits on a screen of `area`
pub fn handle_area(area: Rect) -> Rect {
    let width = (HANDLE_LABEL.chars().count() as u16).min(area.width);
    Rect {
        x: area.right().saturating_sub(width),
        y: area.bottom().saturating_sub(1),
        width,
        height: area.height.min(1),
    }
}

fn draw_handle(frame: &mut Frame, area: Rect) {
    let handle = Paragraph::new(Span::styled(
        HANDLE_LABEL,
        Style::default().fg(Color::Black).bg(Color::Cyan),
    ));
    frame.render_widget(handle, handle_area(area));
}

/// Draw the open toolbar: tabs, panel content, request list
fn draw_toolbar(frame: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Length(3), // Panel tabs
            Constraint::Min(5),    // Panel content + requests
            Constraint::Length(1), // Tooltip / status
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    draw_tabs(frame, app, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    draw_panel_content(frame, app, body[0]);
    draw_requests(frame, app, body[1]);
    draw_status_line(frame, app, chunks[3]);
    draw_footer(frame, app, chunks[4]);

    if let Some(row) = app.detail.as_ref().filter(|_| app.panels.is_detail_window_open()) {
        draw_detail_window(frame, row, centered(frame.area(), 60, 9));
    }
}

fn draw_title_bar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let status = app.feed.status();
    let status_color = match status {
        FeedStatus::Connected => Color::Green,
        FeedStatus::Idle => Color::Yellow,
        FeedStatus::Closed => Color::Red,
        FeedStatus::Unsupported => Color::DarkGray,
    };

    let line = Line::from(vec![
        Span::styled(
            " Debug Toolbar ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            truncate_str(app.feed.root(), (area.width as usize).saturating_sub(40)),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(" │ feed ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            status.as_str(),
            Style::default().fg(status_color).add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn draw_tabs(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let view = app.panels.render();
    let mut spans = Vec::with_capacity(view.tabs.len() * 2);

    for (i, tab) in view.tabs.iter().enumerate() {
        let mut style = if tab.disabled {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
        } else if tab.active {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        if app.focus == Focus::Tabs && i == app.tab_cursor {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }

        let marker = match tab.switch {
            SwitchState::Active => "●",
            SwitchState::Inactive => "○",
        };
        spans.push(Span::styled(format!(" {} {} ", marker, tab.title), style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Tabs))
        .title(" Panels ");

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_panel_content(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);

    let (title, lines) = match app.panels.visible_panel() {
        Some(panel) => {
            let href = format!("{}{}", app.feed.root(), panel.id);
            (
                format!(" {} ", panel.title),
                vec![
                    Line::from(vec![
                        Span::styled("Panel     ", label),
                        Span::styled(panel.id.clone(), Style::default().fg(Color::White)),
                    ]),
                    Line::from(vec![
                        Span::styled("Content   ", label),
                        Span::styled(panel.content_id(), Style::default().fg(Color::White)),
                    ]),
                    Line::from(vec![
                        Span::styled("Switch    ", label),
                        Span::styled(panel.switch.as_str(), Style::default().fg(Color::Yellow)),
                    ]),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Browse    ", label),
                        Span::styled(href, Style::default().fg(Color::Magenta)),
                    ]),
                ],
            )
        }
        None => (
            " No panel ".to_string(),
            vec![Line::from(Span::styled(
                "Select a panel tab and press Enter",
                label,
            ))],
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_requests(frame: &mut Frame, app: &TuiApp, area: Rect) {
    // Lock(2) + Method(7) + Status(4) + borders/padding(~6)
    let fixed_width = 2 + 7 + 4 + 6;
    let path_width = (area.width as usize).saturating_sub(fixed_width).max(10);

    let header_cells = [Column::Method, Column::Status, Column::Path].map(|column| {
        if app.sort.column == column {
            format!("{}{}", column.title(), app.sort.direction.arrow())
        } else {
            column.title().to_string()
        }
    });
    let header = Row::new(vec![
        String::new(),
        header_cells[0].clone(),
        header_cells[2].clone(),
        header_cells[1].clone(),
    ])
    .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let sorted = app.sorted_rows();
    let rows: Vec<Row> = sorted
        .iter()
        .map(|req| {
            let lock = if req.secure { "🔒" } else { "" };
            let row_style = if req.is_active() {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(lock),
                Cell::from(format!("{:>6}", truncate_str(&req.method, 6))).style(method_style(&req.method)),
                Cell::from(truncate_str(&req.path, path_width)),
                Cell::from(req.status.to_string()).style(status_style(req.status)),
            ])
            .style(row_style)
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let title = match app.sort.column {
        Column::Order => format!(" Requests ({}) ", sorted.len()),
        column => format!(" Requests ({}) by {} ", sorted.len(), column.title()),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(7),
            Constraint::Min(10),
            Constraint::Length(4),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style(app.focus == Focus::Requests)),
    )
    .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)));

    let mut state = TableState::default();
    if app.focus == Focus::Requests && !sorted.is_empty() {
        state.select(Some(app.selected_row));
    }

    frame.render_stateful_widget(table, chunks[0], &mut state);

    if !sorted.is_empty() {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        let mut scrollbar_state = ScrollbarState::new(sorted.len()).position(app.selected_row);
        frame.render_stateful_widget(scrollbar, chunks[1], &mut scrollbar_state);
    }
}

fn draw_status_line(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let line = if let Some(message) = &app.status_message {
        Line::from(Span::styled(message.as_str(), Style::default().fg(Color::Yellow)))
    } else if let Some(tooltip) = app.selected_tooltip().filter(|_| app.focus == Focus::Requests) {
        Line::from(vec![
            Span::styled(" ↳ ", Style::default().fg(Color::DarkGray)),
            Span::styled(tooltip, Style::default().fg(Color::White)),
        ])
    } else {
        Line::from("")
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn draw_detail_window(frame: &mut Frame, row: &crate::toolbar::RequestRow, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let scheme = if row.secure { "https" } else { "http" };

    let lines = vec![
        Line::from(vec![
            Span::styled("Method  ", label),
            Span::styled(row.method.as_str(), method_style(&row.method)),
        ]),
        Line::from(vec![
            Span::styled("Status  ", label),
            Span::styled(row.status.to_string(), status_style(row.status)),
        ]),
        Line::from(vec![
            Span::styled("URL     ", label),
            Span::raw(format!("{}://{}{}", scheme, row.host, row.path)),
        ]),
        Line::from(vec![
            Span::styled("Toolbar ", label),
            Span::styled(row.href.as_str(), Style::default().fg(Color::Magenta)),
        ]),
        Line::from(""),
        Line::from(Span::styled("o open in browser  Esc close", label)),
    ];

    let block = Block::default()
        .title(format!(" Request {} ", row.request_id))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let key = Style::default().fg(Color::Cyan);
    let hint = Style::default().fg(Color::DarkGray);

    let mut spans = vec![Span::styled("Tab", key), Span::styled(" Focus  ", hint)];
    match app.focus {
        Focus::Tabs => spans.extend([
            Span::styled("←/→", key),
            Span::styled(" Move  ", hint),
            Span::styled("Enter", key),
            Span::styled(" Open  ", hint),
            Span::styled("Space", key),
            Span::styled(" Switch  ", hint),
        ]),
        Focus::Requests => spans.extend([
            Span::styled("↑/↓", key),
            Span::styled(" Navigate  ", hint),
            Span::styled("Enter", key),
            Span::styled(" Details  ", hint),
            Span::styled("s/S", key),
            Span::styled(" Sort  ", hint),
        ]),
    }
    spans.extend([
        Span::styled("r", key),
        Span::styled(" Reconnect  ", hint),
        Span::styled("t", key),
        Span::styled(" Hide  ", hint),
        Span::styled("q", key),
        Span::styled(" Quit", hint),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// A `width` x `height` rect in the middle of `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Get style for HTTP method
fn method_style(method: &str) -> Style {
    match method {
        "GET" => Style::default().fg(Color::Green),
        "POST" => Style::default().fg(Color::Yellow),
        "PUT" => Style::default().fg(Color::Blue),
        "PATCH" => Style::default().fg(Color::Magenta),
        "DELETE" => Style::default().fg(Color::Red),
        "HEAD" => Style::default().fg(Color::Cyan),
        _ => Style::default().fg(Color::White),
    }
}

/// Get style for HTTP status code
fn status_style(status: u16) -> Style {
    if status >= 500 {
        Style::default().fg(Color::Red)
    } else if status >= 400 {
        Style::default().fg(Color::Yellow)
    } else if status >= 300 {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Green)
    }
}

/// Truncate to `max_len` characters, marking the cut with an ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max_len).collect()
    }
}
