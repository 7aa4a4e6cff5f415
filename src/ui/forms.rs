use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Filters, SortMode};

/// Text typed into the search box. Nothing is sent until the user submits.
#[derive(Default, Clone)]
pub(crate) struct QueryInput {
    pub(crate) text: String,
}

impl QueryInput {
    pub(crate) fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Append a printable character. Control characters are rejected.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            false
        } else {
            self.text.push(ch);
            true
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.text.pop();
    }

    pub(crate) fn build_line(&self, focused: bool) -> Line<'static> {
        let (display, style) = if self.text.is_empty() {
            (
                "Enter book title...".to_string(),
                Style::default().fg(Color::DarkGray),
            )
        } else if focused {
            (self.text.clone(), Style::default().fg(Color::Yellow))
        } else {
            (self.text.clone(), Style::default())
        };
        Line::from(vec![Span::raw("Title: "), Span::styled(display, style)])
    }

    /// Column offset of the cursor after the label.
    pub(crate) fn cursor_offset(&self) -> u16 {
        ("Title: ".len() + self.text.chars().count()) as u16
    }
}

/// Fields available within the filters panel.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub(crate) enum FilterField {
    #[default]
    Author,
    Year,
    Sort,
}

impl FilterField {
    fn label(self) -> &'static str {
        match self {
            FilterField::Author => "Author",
            FilterField::Year => "Year",
            FilterField::Sort => "Sort",
        }
    }
}

/// Author/year filters and the sort selector. The values stay applied while
/// the panel is hidden; `open` only controls whether it is drawn.
#[derive(Default, Clone)]
pub(crate) struct FilterPanel {
    pub(crate) filters: Filters,
    pub(crate) sort: SortMode,
    pub(crate) active: FilterField,
    pub(crate) open: bool,
}

impl FilterPanel {
    /// Show or hide the panel, returning the new visibility.
    pub(crate) fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Move focus to the next field, wrapping from sort back to author.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            FilterField::Author => FilterField::Year,
            FilterField::Year => FilterField::Sort,
            FilterField::Sort => FilterField::Author,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            FilterField::Author => FilterField::Sort,
            FilterField::Year => FilterField::Author,
            FilterField::Sort => FilterField::Year,
        };
    }

    /// Append a character to the active field. The year only takes digits,
    /// and the sort selector takes no text at all.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            FilterField::Author => {
                if !ch.is_control() {
                    self.filters.author.push(ch);
                    true
                } else {
                    false
                }
            }
            FilterField::Year => {
                if ch.is_ascii_digit() {
                    self.filters.year.push(ch);
                    true
                } else {
                    false
                }
            }
            FilterField::Sort => false,
        }
    }

    /// Remove the last character from the active field. On the sort selector
    /// this resets to "Sort By...".
    pub(crate) fn backspace(&mut self) {
        match self.active {
            FilterField::Author => {
                self.filters.author.pop();
            }
            FilterField::Year => {
                self.filters.year.pop();
            }
            FilterField::Sort => self.sort = SortMode::None,
        }
    }

    pub(crate) fn next_sort(&mut self) {
        self.sort = self.sort.next();
    }

    pub(crate) fn previous_sort(&mut self) {
        self.sort = self.sort.previous();
    }

    /// Drop both text filters and the sort order.
    pub(crate) fn reset(&mut self) {
        self.filters.clear();
        self.sort = SortMode::None;
    }

    /// Render a single line for the panel. `focused` is whether the panel
    /// itself has keyboard focus.
    pub(crate) fn build_line(&self, field: FilterField, focused: bool) -> Line<'static> {
        let (display, empty) = match field {
            FilterField::Author => placeholder(&self.filters.author, "Filter by author..."),
            FilterField::Year => placeholder(&self.filters.year, "Filter by year..."),
            FilterField::Sort => (
                format!("< {} >", self.sort.label()),
                self.sort == SortMode::None,
            ),
        };

        let style = if focused && self.active == field {
            Style::default().fg(Color::Yellow)
        } else if empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{:<6}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor column for the active text field, if it takes text.
    pub(crate) fn cursor_offset(&self) -> Option<u16> {
        let value = match self.active {
            FilterField::Author => &self.filters.author,
            FilterField::Year => &self.filters.year,
            FilterField::Sort => return None,
        };
        Some((8 + value.chars().count()) as u16)
    }
}

fn placeholder(value: &str, hint: &str) -> (String, bool) {
    if value.is_empty() {
        (hint.to_string(), true)
    } else {
        (value.to_string(), false)
    }
}
