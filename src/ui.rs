//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * Both pages share a two-row split: content on top and a one-line status
//!   bar at the bottom.
//! * The listing draws each article as a [`CARD_ROWS`]-line card.  If you
//!   change the card height, change the constant too: the scroll trigger
//!   measures distance in rows.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{articles, App, CARD_ROWS};
use crate::routes::{Detail, Route};

/// Characters of body text shown under each title in the listing.
const EXCERPT_CHARS: usize = 100;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    match app.route {
        Route::Listing => draw_listing(app, frame, main_area),
        Route::Article(id) => draw_article(app, id, frame, main_area),
    }
    draw_status_bar(app, frame, status_area);
}

/// Render the article cards and the feed footer.
fn draw_listing(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Blog · All posts ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [list_area, footer_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(inner);
    app.viewport_rows = usize::from(list_area.height);

    let state = app.feed.state();

    if state.items().is_empty() {
        let text = if state.has_more() {
            "Loading articles…"
        } else {
            "No articles yet."
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            list_area,
        );
    } else {
        let cards: Vec<ListItem> = state
            .items()
            .iter()
            .map(|article| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        article.title.clone(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        article.excerpt(EXCERPT_CHARS),
                        Style::default().fg(Color::Gray),
                    )),
                    Line::from(vec![
                        Span::styled(
                            format!("#{}", article.id),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw("  "),
                        Span::styled("Read more →", Style::default().fg(Color::Blue)),
                    ]),
                ])
            })
            .collect();
        debug_assert!(cards.iter().all(|c| c.height() == CARD_ROWS));

        let list = List::new(cards)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, list_area, &mut app.list_state);
    }

    frame.render_widget(feed_footer(app), footer_area);
}

/// Loading indicator, end-of-feed message or load-more hint.
fn feed_footer(app: &App) -> Paragraph<'static> {
    let state = app.feed.state();
    let line = if state.is_loading() {
        Line::from(Span::styled(
            "⟳ Loading more articles…",
            Style::default().fg(Color::Yellow),
        ))
    } else if !state.has_more() {
        Line::from(vec![
            Span::styled(
                "🎉 You've reached the end! Thanks for reading.",
                Style::default().fg(Color::Green),
            ),
            Span::raw("  t: back to top"),
        ])
    } else {
        Line::from(Span::styled(
            "m: load more articles",
            Style::default().fg(Color::Blue),
        ))
    };
    Paragraph::new(line).centered()
}

/// Render a single article page.
fn draw_article(app: &App, id: u64, frame: &mut Frame, area: Rect) {
    let route = Route::Article(id);
    let block = Block::default()
        .title(format!(" {} ", route.path()))
        .borders(Borders::ALL);

    let lines: Vec<Line> = match app.details.detail(id) {
        Detail::Ready(article) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    article.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("by author #{}", article.author_id),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::raw(""),
            ];
            lines.extend(article.body.lines().map(|l| Line::raw(l.to_string())));
            lines
        }
        Detail::Loading => vec![Line::styled(
            "Loading article…",
            Style::default().fg(Color::Yellow),
        )],
        Detail::NotFound => vec![Line::styled(
            format!("Article #{id} not found."),
            Style::default().fg(Color::Red),
        )],
        Detail::Unavailable => vec![Line::styled(
            "Article unavailable. r: retry",
            Style::default().fg(Color::Red),
        )],
    };

    let page = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(page, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let loaded = app
        .last_loaded
        .map(|t| format!("updated {}", t.format("%H:%M:%S")))
        .unwrap_or_default();
    let keys = match app.route {
        Route::Listing => "q: quit  ↑/↓: scroll  enter: open  m: more",
        Route::Article(_) => "q: quit  esc: back  ↑/↓: scroll  r: reload",
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            articles(app.feed.state().items().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(loaded, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::raw(keys),
    ]));
    frame.render_widget(status, area);
}
