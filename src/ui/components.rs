//! UI rendering components

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

use super::app::{App, MessageKind, Tab};
use super::input::InputMode;
use crate::models::{ResultTable, SourceKind};

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header/tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

/// Render the header with navigation tabs
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Rolelens "))
        .select(app.tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Render the main content area
fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.tab {
        Tab::UserRoles | Tab::UserSearch => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(area);
            render_input(frame, app, chunks[0]);
            render_results(frame, app, chunks[1]);
        }
        Tab::RoleUsers => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(area);
            render_role_picker(frame, app, chunks[0]);
            render_results(frame, app, chunks[1]);
        }
    }
}

/// Render the input field of the active tab
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let Some(value) = app.current_input() else {
        return;
    };

    let label = match app.tab {
        Tab::UserSearch => "Search users",
        _ => "Full name",
    };
    // Busy tabs swap their label and ignore Enter until the lookup lands
    let title = if app.is_tab_busy(app.tab) {
        format!(" {} (Fetching...) ", label)
    } else {
        format!(" {} ", label)
    };

    let editing = app.input_mode == InputMode::Editing;
    let style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let input = Paragraph::new(value).style(Style::default().fg(Color::White)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_bottom(" /: Edit │ Enter: Submit │ Esc: Stop editing ")
            .style(style),
    );
    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((area.x + cursor_offset(value, area.width), area.y + 1));
    }
}

/// Column of the input cursor, kept inside the bordered field
fn cursor_offset(value: &str, width: u16) -> u16 {
    let typed = u16::try_from(value.chars().count()).unwrap_or(u16::MAX);
    typed.min(width.saturating_sub(2)) + 1
}

/// Render the role list on the Role Users tab
fn render_role_picker(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .roles
        .iter()
        .map(|role| ListItem::new(role.name.clone()))
        .collect();

    let title = if app.is_loading_roles() {
        " Roles (loading...) ".to_string()
    } else {
        format!(" Roles ({}) ", app.roles.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(" ↑↓ Select │ Enter: Apply │ r: Reload "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(50, 50, 80))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    if !app.roles.is_empty() {
        list_state.select(Some(app.role_index));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Render the result table of the active tab
fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let table = app.current_table();
    let title = match app.tab {
        Tab::UserRoles => match &app.user_roles_subject {
            Some(name) => format!(" Roles for '{}' ({}) ", name, table.rows.len()),
            None => " Roles ".to_string(),
        },
        Tab::RoleUsers => match &app.role_users_subject {
            Some(name) => format!(" Users with '{}' ({}) ", name, table.rows.len()),
            None => " Users ".to_string(),
        },
        Tab::UserSearch => format!(" Users ({}) ", table.rows.len()),
    };
    let hint = match app.tab {
        Tab::UserSearch => " ↑↓ Navigate │ Enter: Show roles │ e/E: Export ",
        _ => " 🟢 Direct │ 🔵 Team │ 🟣 Both │ e/E: Export │ q: Quit ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(hint);

    if table.is_empty() {
        let empty = Paragraph::new("No results.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let widget = build_table(table).block(block);
    let mut table_state = TableState::default();
    // The Role Users cursor lives in the role picker
    if app.tab != Tab::RoleUsers {
        table_state.select(Some(app.result_index));
    }

    frame.render_stateful_widget(widget, area, &mut table_state);
}

fn build_table(table: &ResultTable) -> Table<'static> {
    let header = Row::new(table.columns.clone())
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = table
                .sources
                .get(i)
                .map(|source| source_style(*source))
                .unwrap_or_default();
            Row::new(row.clone()).style(style)
        })
        .collect();

    let width = 100 / table.columns.len().max(1) as u16;
    let widths = vec![Constraint::Percentage(width); table.columns.len()];

    Table::new(rows, widths)
        .header(header)
        .row_highlight_style(
            Style::default()
                .bg(Color::Rgb(50, 50, 80))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ")
}

fn source_style(source: SourceKind) -> Style {
    match source {
        SourceKind::Direct => Style::default().fg(Color::Green),
        SourceKind::Team => Style::default().fg(Color::Blue),
        SourceKind::DirectAndTeam => Style::default().fg(Color::Magenta),
    }
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state_indicator = if app.is_busy() {
        Span::styled(" ● Loading... ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" ● Ready ", Style::default().fg(Color::Green))
    };

    let message = match &app.message {
        Some(message) => {
            let color = match message.kind {
                MessageKind::Info => Color::Green,
                MessageKind::Error => Color::Red,
            };
            Span::styled(format!(" │ {} ", message.text), Style::default().fg(color))
        }
        None => Span::raw(""),
    };

    let status = Line::from(vec![
        state_indicator,
        Span::raw(format!("│ {} ", app.environment)),
        message,
    ]);

    let paragraph = Paragraph::new(status).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}
