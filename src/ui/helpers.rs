use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::catalog::Links;
use crate::models::Book;

/// Build the text of one result card: title, authors, year, then the cover
/// and detail links.
pub(crate) fn build_book_card_lines(
    book: &Book,
    links: &Links,
    selected: bool,
) -> Vec<Line<'static>> {
    let title = if book.title_or_empty().is_empty() {
        "(untitled)".to_string()
    } else {
        book.title_or_empty().to_string()
    };
    let title = if selected {
        format!("▶ {title}")
    } else {
        title
    };

    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(book.authors_line(), Style::default().fg(Color::Gray)),
            Span::raw("  •  "),
            Span::styled(book.year_line(), Style::default().fg(Color::Gray)),
        ]),
        Line::from(vec![
            Span::styled("Cover: ", Style::default().fg(Color::DarkGray)),
            Span::styled(links.cover_url(book), Style::default().fg(Color::Cyan)),
        ]),
    ];

    match links.detail_url(book) {
        Some(url) => lines.push(Line::from(vec![
            Span::styled("Details: ", Style::default().fg(Color::DarkGray)),
            Span::styled(url, Style::default().fg(Color::Cyan)),
        ])),
        None => lines.push(Line::from(Span::styled(
            "No details link",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    lines
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
