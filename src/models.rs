//! Domain models shared between the catalog client, the search reducer, and
//! the TUI. `Book` mirrors one entry of the catalog's `docs` array; the filter
//! and sort types describe how the raw list is narrowed before rendering.

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// One document returned by the catalog search endpoint. Every field is
/// optional because the catalog omits whatever it does not know about a work.
pub struct Book {
    /// Work title as reported by the catalog.
    #[serde(default)]
    pub title: Option<String>,
    /// Ordered list of author display names.
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    /// Year of first publication. Kept numeric so year sorting is not
    /// lexicographic.
    #[serde(default)]
    pub first_publish_year: Option<i64>,
    /// Numeric cover image id understood by the covers service.
    #[serde(default)]
    pub cover_i: Option<i64>,
    /// Catalog path such as `/works/OL27448W`, appended to the details host.
    #[serde(default)]
    pub key: Option<String>,
}

impl Book {
    /// Title used for display and for title sorting.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Authors joined with commas, or `Unknown Author` when the catalog gave
    /// none.
    pub fn authors_line(&self) -> String {
        match &self.author_name {
            Some(names) if !names.is_empty() => names.join(", "),
            _ => "Unknown Author".to_string(),
        }
    }

    /// Publication year as text, `N/A` when missing or zero.
    pub fn year_line(&self) -> String {
        match self.first_publish_year {
            Some(year) if year != 0 => year.to_string(),
            _ => "N/A".to_string(),
        }
    }

    /// Sort key for the year modes. Missing years sort as zero.
    pub fn year_key(&self) -> i64 {
        self.first_publish_year.unwrap_or(0)
    }

    /// Cover id usable with the covers service. A zero id is treated as no
    /// cover, matching how the catalog marks missing artwork.
    pub fn cover_id(&self) -> Option<i64> {
        self.cover_i.filter(|id| *id != 0)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title_or_empty())
    }
}

/// Body of the catalog search response. Only `docs` matters to us; a body
/// without it is read as an empty result.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub docs: Vec<Book>,
}

/// Local narrowing applied to the raw result list. Empty strings mean the
/// filter is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Case-insensitive substring matched against any author name.
    pub author: String,
    /// Exact publication year, compared as text.
    pub year: String,
}

impl Filters {
    pub fn is_active(&self) -> bool {
        !self.author.is_empty() || !self.year.is_empty()
    }

    pub fn clear(&mut self) {
        self.author.clear();
        self.year.clear();
    }
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Keep the catalog's order.
    #[default]
    None,
    YearDesc,
    YearAsc,
    TitleAsc,
    TitleDesc,
}

impl SortMode {
    const ALL: [SortMode; 5] = [
        SortMode::None,
        SortMode::YearDesc,
        SortMode::YearAsc,
        SortMode::TitleAsc,
        SortMode::TitleDesc,
    ];

    /// Label shown in the sort selector.
    pub fn label(self) -> &'static str {
        match self {
            SortMode::None => "Sort By...",
            SortMode::YearDesc => "Year (Newest → Oldest)",
            SortMode::YearAsc => "Year (Oldest → Newest)",
            SortMode::TitleAsc => "Title (A → Z)",
            SortMode::TitleDesc => "Title (Z → A)",
        }
    }

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|mode| *mode == self)
            .unwrap_or_default()
    }

    /// Next option in the selector, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Previous option in the selector, wrapping around.
    pub fn previous(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lines_fall_back_when_fields_are_missing() {
        let book = Book::default();
        assert_eq!(book.authors_line(), "Unknown Author");
        assert_eq!(book.year_line(), "N/A");
        assert_eq!(book.title_or_empty(), "");
        assert_eq!(book.year_key(), 0);
    }

    #[test]
    fn authors_are_joined_in_order() {
        let book = Book {
            author_name: Some(vec!["Terry Pratchett".into(), "Neil Gaiman".into()]),
            ..Book::default()
        };
        assert_eq!(book.authors_line(), "Terry Pratchett, Neil Gaiman");
    }

    #[test]
    fn zero_cover_id_counts_as_missing() {
        let book = Book {
            cover_i: Some(0),
            ..Book::default()
        };
        assert_eq!(book.cover_id(), None);
    }

    #[test]
    fn sort_mode_cycles_both_ways() {
        assert_eq!(SortMode::None.next(), SortMode::YearDesc);
        assert_eq!(SortMode::TitleDesc.next(), SortMode::None);
        assert_eq!(SortMode::None.previous(), SortMode::TitleDesc);
        assert_eq!(SortMode::YearAsc.previous(), SortMode::YearDesc);
    }

    #[test]
    fn response_without_docs_reads_as_empty() {
        let response: CatalogResponse = serde_json::from_str(r#"{"numFound":0}"#).unwrap();
        assert!(response.docs.is_empty());
    }
}
