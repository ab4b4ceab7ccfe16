use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use placedash_core::ResourceKind;

use crate::app::{App, AppState, View};

use super::styles;
use super::tabs::{detail, list};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  placedash";
    let location = app.current_route().to_location();
    let help_hint = "[?] Help";

    let used = title.len() + location.len() + help_hint.len() + 6;
    let padding = (area.width as usize).saturating_sub(used);

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw("   "),
        Span::styled(location, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, kind) in ResourceKind::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, kind.title());
        spans.push(Span::styled(label, styles::tab_style(*kind == app.current_tab)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::List => list::render(frame, app, area),
        View::Detail { .. } => detail::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.view {
        View::List => "[/]search [f]ilter [n/p]age [u]pdate [q]uit",
        View::Detail { .. } => "[Esc] back [u]pdate [q]uit",
    };

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.view == View::List && app.list.is_loading() {
        " Loading... ".to_string()
    } else {
        format!(" Updated {} ", app.cache_age())
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(50, 25, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  placedash", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-4", "Switch tabs"),
        help_line("←/→", "Previous/next tab"),
        help_line("↑/↓", "Move selection"),
        help_line("n/p", "Next/previous page"),
        help_line("Enter", "Open details"),
        help_line("Esc", "Back to list"),
        Line::from(""),
        Line::from(Span::styled(" Filters", styles::highlight_style())),
        help_line("/", "Search"),
        help_line("f", "Filter by user id"),
        help_line("x", "Reset filters"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("u", "Clear cache and reload"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(36, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("        Quit placedash?", styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::raw("        "),
            Span::styled("[y]", styles::help_key_style()),
            Span::styled(" Yes    ", styles::help_desc_style()),
            Span::styled("[n]", styles::help_key_style()),
            Span::styled(" No", styles::help_desc_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use placedash_core::Route;

    use crate::app::tests::test_app;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        screen_text(&terminal)
    }

    #[test]
    fn test_centered_rect_fixed_clamps_to_area() {
        let r = centered_rect_fixed(50, 20, Rect::new(0, 0, 30, 10));
        assert_eq!(r, Rect::new(0, 0, 30, 10));

        let r = centered_rect_fixed(10, 4, Rect::new(0, 0, 30, 10));
        assert_eq!(r, Rect::new(10, 3, 10, 4));
    }

    #[tokio::test]
    async fn test_render_loading_then_list() {
        let mut app = test_app(23);
        app.navigate(Route::parse("comments?page=3").unwrap());

        let text = draw(&app);
        assert!(text.contains("[3] Comments"));
        assert!(text.contains("Loading..."));
        assert!(text.contains("Comments (...)"));

        // Wait for the spawned fetch to report back
        while app.list.is_loading() {
            tokio::task::yield_now().await;
            app.check_background_tasks();
        }

        let text = draw(&app);
        assert!(text.contains("comment number 21"));
        assert!(text.contains("Page 3 of 3"));
        assert!(text.contains("Comments (23)"));
        assert!(text.contains("/dashboard/comments?page=3"));
    }

    #[test]
    fn test_render_overlays() {
        let mut app = test_app(1);
        app.state = AppState::ShowingHelp;
        assert!(draw(&app).contains("Clear cache and reload"));

        app.state = AppState::ConfirmingQuit;
        assert!(draw(&app).contains("Quit placedash?"));
    }
}
