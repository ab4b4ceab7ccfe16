use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use placedash_core::models::{Post, User};
use placedash_core::Record;

use crate::app::{App, LoadState, View};
use crate::ui::styles;
use crate::utils::format::{format_date, format_optional};

const LABEL_WIDTH: usize = 14;

/// Render the detail view for the record named by the current route
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let segment = match &app.view {
        View::Detail { segment, .. } => segment.as_str(),
        View::List => app.current_tab.segment(),
    };

    let (title, lines) = match &app.detail {
        LoadState::Loading => (
            String::new(),
            vec![Line::from(Span::styled(" Loading...", styles::muted_style()))],
        ),
        LoadState::Failed(_) => (String::new(), not_found_lines(segment)),
        LoadState::Ready(record) => (detail_title(record), record_lines(record)),
    };

    let block = Block::default()
        .title(format!(" ← Back to {} (Esc) ", segment))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let mut content = Vec::with_capacity(lines.len() + 2);
    if !title.is_empty() {
        content.push(Line::from(Span::styled(title, styles::title_style())));
        content.push(Line::from(""));
    }
    content.extend(lines);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn not_found_lines(segment: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled("  404", styles::error_style())),
        Line::from(Span::styled("  Item not found", styles::title_style())),
        Line::from(Span::styled(
            format!("  Press Esc to return to {}", segment),
            styles::muted_style(),
        )),
    ]
}

/// Heading: full name for users, title for posts, `KIND #id` otherwise
fn detail_title(record: &Record) -> String {
    match record {
        Record::User(u) => u.full_name(),
        Record::Post(p) => p.title.clone(),
        _ => format!("{} #{}", record.kind().segment().to_uppercase(), record.id()),
    }
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(title.to_string(), styles::highlight_style()))
}

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH), styles::muted_style()),
        Span::raw(value.into()),
    ])
}

fn record_lines(record: &Record) -> Vec<Line<'static>> {
    match record {
        Record::User(u) => user_lines(u),
        Record::Post(p) => post_lines(p),
        Record::Comment(c) => vec![
            section("Comment"),
            Line::from(c.comment.clone()),
            Line::from(""),
            field("User ID:", c.user_id.to_string()),
            field("Post ID:", c.post_id.to_string()),
        ],
        Record::Album(a) => vec![
            field("Title:", a.title.clone()),
            field("User ID:", a.user_id.to_string()),
        ],
    }
}

fn user_lines(user: &User) -> Vec<Line<'static>> {
    let mut lines = vec![section("Personal Information")];
    lines.push(field("Full Name:", user.full_name()));
    lines.push(field("Email:", user.email.clone()));
    if let Some(ref phone) = user.phone {
        lines.push(field("Phone:", phone.clone()));
    }
    if let Some(ref website) = user.website {
        lines.push(field("Website:", website.clone()));
    }
    if let Some(ref birth_date) = user.birth_date {
        lines.push(field("Birth Date:", format_date(birth_date)));
    }

    lines.push(Line::from(""));
    lines.push(section("Login Information"));
    lines.push(field("Username:", user.login.username.clone()));
    lines.push(field("UUID:", user.login.uuid.clone()));
    if let Some(ref registered) = user.login.registered {
        lines.push(field("Registered:", format_date(registered)));
    }

    lines.push(Line::from(""));
    lines.push(section("Address"));
    lines.push(field("Street:", user.address.street.clone()));
    if let Some(ref suite) = user.address.suite {
        lines.push(field("Suite:", suite.clone()));
    }
    lines.push(field("City:", user.address.city.clone()));
    lines.push(field("Zipcode:", user.address.zipcode.clone()));
    if let (Some(geo), Some(map)) = (&user.address.geo, user.map_url()) {
        lines.push(field("Coordinates:", format!("{}, {}", geo.lat, geo.lng)));
        lines.push(field("Map:", map));
    }

    if let Some(ref company) = user.company {
        lines.push(Line::from(""));
        lines.push(section("Company"));
        lines.push(field("Name:", company.name.clone()));
        if let Some(ref catch_phrase) = company.catch_phrase {
            lines.push(field("Catch Phrase:", catch_phrase.clone()));
        }
        if let Some(ref bs) = company.bs {
            lines.push(field("Business:", bs.clone()));
        }
    }

    lines
}

fn post_lines(post: &Post) -> Vec<Line<'static>> {
    vec![
        section("Post Information"),
        field("Slug:", post.slug.clone()),
        field("URL:", post.url.clone()),
        field("Category:", post.category.clone()),
        Line::from(vec![
            Span::styled(format!("{:<width$}", "Status:", width = LABEL_WIDTH), styles::muted_style()),
            Span::styled(post.status.clone(), styles::status_style(&post.status)),
        ]),
        field("User ID:", post.user_id.to_string()),
        field("Published At:", post.published_at.clone()),
        field("Updated At:", post.updated_at.clone()),
        field("Image:", format_optional(post.image.as_deref(), "-")),
        Line::from(""),
        section("Content"),
        Line::from(post.content.clone()),
    ]
}
