use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use placedash_core::{Record, ResourceKind};

use crate::app::{App, AppState, LoadState};
use crate::ui::styles;
use crate::utils::format::{format_date, single_line, truncate_string};

/// Render the list view: filter bar, table and page footer
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filters
            Constraint::Min(5),    // Table
            Constraint::Length(1), // Pagination
        ])
        .split(area);

    render_filter_bar(frame, app, chunks[0]);

    match &app.list {
        LoadState::Loading => render_message(frame, app, chunks[1], "Loading...", styles::muted_style()),
        LoadState::Failed(error) => render_message(
            frame,
            app,
            chunks[1],
            &format!("Error: {}  (press u to retry)", error),
            styles::error_style(),
        ),
        LoadState::Ready(_) => {
            let filtered = app.filtered();
            if filtered.is_empty() {
                render_message(frame, app, chunks[1], "No items found", styles::muted_style());
            } else {
                render_table(frame, app, &filtered, chunks[1]);
                if app.total_pages() > 1 {
                    render_pagination(frame, app, &filtered, chunks[2]);
                }
            }
        }
    }
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let filters = &app.view_state.filters;
    let editing_search = app.state == AppState::EditingSearch;
    let editing_user_id = app.state == AppState::EditingUserId;

    let cursor = |editing: bool| if editing { "▌" } else { "" };

    let mut spans = vec![
        Span::styled(" [/] Search: ", styles::muted_style()),
        Span::styled(
            format!("{}{}", filters.search, cursor(editing_search)),
            styles::input_style(editing_search),
        ),
        Span::raw("   "),
        Span::styled("[f] User ID: ", styles::muted_style()),
        Span::styled(
            format!("{}{}", filters.user_id, cursor(editing_user_id)),
            styles::input_style(editing_user_id),
        ),
    ];
    if !filters.is_empty() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled("[x] Reset", styles::highlight_style()));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing_search || editing_user_id));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn list_block(app: &App) -> Block<'static> {
    let count = match app.list {
        LoadState::Loading => "...".to_string(),
        _ => app.filtered_count().to_string(),
    };
    let title = format!(" {} ({}) ", app.current_tab.title(), count);
    Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.state == AppState::Normal))
}

fn render_message(frame: &mut Frame, app: &App, area: Rect, message: &str, style: ratatui::style::Style) {
    let paragraph = Paragraph::new(Line::from(Span::styled(format!(" {}", message), style)))
        .block(list_block(app));
    frame.render_widget(paragraph, area);
}

fn header_cells(kind: ResourceKind) -> Vec<&'static str> {
    match kind {
        ResourceKind::Users => vec!["ID", "Name", "Email", "Username"],
        ResourceKind::Posts => vec!["ID", "Title", "Category", "Published", "User"],
        ResourceKind::Comments => vec!["ID", "Comment", "Post", "User"],
        ResourceKind::Albums => vec!["ID", "Title", "User"],
    }
}

fn column_widths(kind: ResourceKind) -> Vec<Constraint> {
    match kind {
        ResourceKind::Users => vec![
            Constraint::Length(5),
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Fill(2),
        ],
        ResourceKind::Posts => vec![
            Constraint::Length(5),
            Constraint::Fill(4),
            Constraint::Fill(1),
            Constraint::Length(13),
            Constraint::Length(5),
        ],
        ResourceKind::Comments => vec![
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(5),
            Constraint::Length(5),
        ],
        ResourceKind::Albums => vec![
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(5),
        ],
    }
}

fn row_cells(record: &Record) -> Vec<String> {
    match record {
        Record::User(u) => vec![
            u.id.to_string(),
            u.full_name(),
            u.email.clone(),
            u.handle(),
        ],
        Record::Post(p) => vec![
            p.id.to_string(),
            p.title.clone(),
            p.category.clone(),
            format_date(&p.published_at),
            p.user_id.to_string(),
        ],
        Record::Comment(c) => vec![
            c.id.to_string(),
            truncate_string(&single_line(&c.comment), 120),
            c.post_id.to_string(),
            c.user_id.to_string(),
        ],
        Record::Album(a) => vec![a.id.to_string(), a.title.clone(), a.user_id.to_string()],
    }
}

fn render_table(frame: &mut Frame, app: &App, filtered: &[&Record], area: Rect) {
    let page = app.visible_page(filtered);

    let header = Row::new(header_cells(app.current_tab).into_iter().map(Cell::from))
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = page
        .items
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(row_cells(record).into_iter().map(Cell::from)).style(style)
        })
        .collect();

    let table = Table::new(rows, column_widths(app.current_tab))
        .header(header)
        .block(list_block(app))
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_pagination(frame: &mut Frame, app: &App, filtered: &[&Record], area: Rect) {
    let page = app.visible_page(filtered);
    let first = page.start_index() + 1;
    let last = page.start_index() + page.items.len();

    let mut spans = vec![Span::styled(
        format!(" Page {} of {}", page.page, page.total_pages),
        styles::highlight_style(),
    )];
    spans.push(Span::styled(
        format!("  ·  Showing {}-{} of {}", first, last, page.total_items),
        styles::muted_style(),
    ));
    let prev = if page.page > 1 { "[p] Previous " } else { "" };
    let next = if page.page < page.total_pages { "[n] Next" } else { "" };
    spans.push(Span::styled(format!("   {}{}", prev, next), styles::muted_style()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use placedash_core::models::Comment;

    #[test]
    fn test_headers_match_row_shape() {
        let comment = Record::Comment(Comment {
            id: 1,
            post_id: 2,
            user_id: 3,
            comment: "line one\nline two".to_string(),
        });
        let cells = row_cells(&comment);
        assert_eq!(cells.len(), header_cells(ResourceKind::Comments).len());
        assert_eq!(cells[1], "line one line two");

        for kind in ResourceKind::ALL {
            assert_eq!(header_cells(kind).len(), column_widths(kind).len());
        }
    }
}
