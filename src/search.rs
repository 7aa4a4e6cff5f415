//! Search controller state and the pure functions that move it forward.
//!
//! `SearchState` is an immutable record: every transition consumes the old
//! value and returns the next one, so the whole lifecycle can be driven from
//! tests without a terminal or a network. The visible list is never stored;
//! `derive_visible_list` recomputes it from the raw results, the filters, and
//! the sort mode whenever the UI draws.

use std::cmp::Ordering;
use std::num::NonZeroUsize;

use tracing::{debug, error, info};

use crate::catalog::FetchError;
use crate::config::DEFAULT_RESULT_LIMIT;
use crate::models::{Book, Filters, SortMode};

/// Shown when the catalog answered but matched nothing.
pub const NO_BOOKS_MESSAGE: &str = "No books found.";
/// Shown for any transport or decoding failure.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch books.";

/// A search the UI should dispatch to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

/// What came back for a dispatched request.
#[derive(Debug)]
pub struct SearchResponse {
    pub seq: u64,
    pub outcome: Result<Vec<Book>, FetchError>,
}

/// The three mutually exclusive display states of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    /// Either an error message or a non-empty result list is available.
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    query: String,
    loading: bool,
    error: Option<String>,
    books: Vec<Book>,
    latest_seq: u64,
    limit: NonZeroUsize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::with_limit(DEFAULT_RESULT_LIMIT)
    }
}

impl SearchState {
    /// Start idle, keeping at most `limit` documents from each response.
    pub fn with_limit(limit: NonZeroUsize) -> Self {
        Self {
            query: String::new(),
            loading: false,
            error: None,
            books: Vec::new(),
            latest_seq: 0,
            limit,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Raw result list in catalog order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Sequence number of the most recently issued request, zero before the
    /// first search.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() || !self.books.is_empty() {
            Phase::Settled
        } else {
            Phase::Idle
        }
    }

    /// Begin a search for `query`. Blank input leaves the state untouched and
    /// yields no request. Otherwise the previous results and error are
    /// dropped, the state goes to loading, and a request tagged with a fresh
    /// sequence number is returned for dispatch.
    pub fn submit_search(self, query: &str) -> (Self, Option<SearchRequest>) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return (self, None);
        }

        let seq = self.latest_seq + 1;
        let request = SearchRequest {
            seq,
            query: trimmed.to_string(),
        };
        info!(query = %request.query, seq, "submitting catalog search");

        let next = Self {
            query: trimmed.to_string(),
            loading: true,
            error: None,
            books: Vec::new(),
            latest_seq: seq,
            limit: self.limit,
        };
        (next, Some(request))
    }

    /// Fold a finished request into the state. Responses for anything other
    /// than the latest request are dropped so a slow earlier search cannot
    /// overwrite a newer one.
    pub fn resolve(self, response: SearchResponse) -> Self {
        if response.seq != self.latest_seq {
            debug!(
                seq = response.seq,
                latest = self.latest_seq,
                "discarding stale catalog response"
            );
            return self;
        }

        let mut next = Self {
            loading: false,
            ..self
        };

        match response.outcome {
            Ok(mut docs) if !docs.is_empty() => {
                let received = docs.len();
                docs.truncate(next.limit.get());
                info!(received, kept = docs.len(), "catalog search finished");
                next.books = docs;
                next.error = None;
            }
            Ok(_) => {
                info!(query = %next.query, "catalog search matched nothing");
                next.books.clear();
                next.error = Some(NO_BOOKS_MESSAGE.to_string());
            }
            Err(err) => {
                error!(error = %err, query = %next.query, "catalog search failed");
                next.books.clear();
                next.error = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }

        next
    }
}

/// Apply the author and year filters, then the sort mode, to the raw result
/// list. Pure: the same inputs always give the same output, and the input
/// slice is not touched.
pub fn derive_visible_list<'a>(
    raw: &'a [Book],
    filters: &Filters,
    sort: SortMode,
) -> Vec<&'a Book> {
    let author_needle = filters.author.to_lowercase();

    let mut visible: Vec<&Book> = raw
        .iter()
        .filter(|book| matches_author(book, &author_needle))
        .filter(|book| matches_year(book, &filters.year))
        .collect();

    // `sort_by` is stable, so ties keep their filtered order.
    match sort {
        SortMode::None => {}
        SortMode::YearDesc => visible.sort_by(|a, b| b.year_key().cmp(&a.year_key())),
        SortMode::YearAsc => visible.sort_by(|a, b| a.year_key().cmp(&b.year_key())),
        SortMode::TitleAsc => visible.sort_by(|a, b| compare_titles(a, b)),
        SortMode::TitleDesc => visible.sort_by(|a, b| compare_titles(b, a)),
    }

    visible
}

fn matches_author(book: &Book, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    book.author_name.as_ref().is_some_and(|names| {
        names
            .iter()
            .any(|name| name.to_lowercase().contains(needle))
    })
}

fn matches_year(book: &Book, year: &str) -> bool {
    if year.is_empty() {
        return true;
    }
    book.first_publish_year
        .is_some_and(|published| published.to_string() == year)
}

/// Case-insensitive title order. Titles that differ only in case put the
/// lowercase spelling first, the way locale-aware collation does, and the
/// order stays total.
fn compare_titles(a: &Book, b: &Book) -> Ordering {
    let (a, b) = (a.title_or_empty(), b.title_or_empty());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, year: Option<i64>, authors: &[&str]) -> Book {
        let author_name = if authors.is_empty() {
            None
        } else {
            Some(authors.iter().map(|n| n.to_string()).collect())
        };
        Book {
            title: Some(title.to_string()),
            first_publish_year: year,
            author_name,
            ..Book::default()
        }
    }

    fn titles(list: &[&Book]) -> Vec<String> {
        list.iter().map(|b| b.title_or_empty().to_string()).collect()
    }

    fn loading(query: &str) -> (SearchState, SearchRequest) {
        let (state, request) = SearchState::default().submit_search(query);
        (state, request.expect("non-blank query issues a request"))
    }

    #[test]
    fn blank_query_is_a_no_op() {
        for query in ["", "   ", "\t\n"] {
            let before = SearchState::default();
            let (after, request) = before.clone().submit_search(query);
            assert!(request.is_none());
            assert_eq!(after, before);
        }
    }

    #[test]
    fn submit_clears_previous_results_and_starts_loading() {
        let (state, request) = loading("dune");
        let state = state.resolve(SearchResponse {
            seq: request.seq,
            outcome: Ok(vec![book("Dune", Some(1965), &[])]),
        });
        assert_eq!(state.books().len(), 1);

        let (state, request) = state.submit_search("  dune messiah ");
        let request = request.unwrap();
        assert_eq!(request.query, "dune messiah");
        assert_eq!(request.seq, 2);
        assert!(state.is_loading());
        assert!(state.books().is_empty());
        assert!(state.error().is_none());
        assert_eq!(state.phase(), Phase::Loading);
    }

    #[test]
    fn results_are_capped_and_keep_catalog_order() {
        let (state, request) = loading("the");
        let docs: Vec<Book> = (0..150)
            .map(|i| book(&format!("Book {i}"), Some(i), &[]))
            .collect();
        let state = state.resolve(SearchResponse {
            seq: request.seq,
            outcome: Ok(docs),
        });

        assert!(!state.is_loading());
        assert_eq!(state.books().len(), 100);
        assert_eq!(state.books()[0].title_or_empty(), "Book 0");
        assert_eq!(state.books()[99].title_or_empty(), "Book 99");
        assert_eq!(state.phase(), Phase::Settled);
    }

    #[test]
    fn short_result_lists_are_kept_whole() {
        let (state, request) = loading("the");
        let docs = vec![book("B", None, &[]), book("A", None, &[])];
        let state = state.resolve(SearchResponse {
            seq: request.seq,
            outcome: Ok(docs),
        });
        let all: Vec<&Book> = state.books().iter().collect();
        assert_eq!(titles(&all), vec!["B", "A"]);
    }

    #[test]
    fn custom_limit_is_respected() {
        let limit = NonZeroUsize::new(3).unwrap();
        let (state, request) = SearchState::with_limit(limit).submit_search("x");
        let state = state.resolve(SearchResponse {
            seq: request.unwrap().seq,
            outcome: Ok((0..10).map(|i| book(&i.to_string(), None, &[])).collect()),
        });
        assert_eq!(state.books().len(), 3);
    }

    #[test]
    fn smallest_limit_still_settles_with_results() {
        let (state, request) = SearchState::with_limit(NonZeroUsize::MIN).submit_search("dune");
        let state = state.resolve(SearchResponse {
            seq: request.unwrap().seq,
            outcome: Ok(vec![book("Dune", Some(1965), &[]), book("Emma", None, &[])]),
        });
        assert_eq!(state.phase(), Phase::Settled);
        assert!(state.error().is_none());
        assert_eq!(state.books().len(), 1);
        assert_eq!(state.books()[0].title_or_empty(), "Dune");
    }

    #[test]
    fn empty_response_reports_no_books() {
        let (state, request) = loading("qwertyuiop");
        let state = state.resolve(SearchResponse {
            seq: request.seq,
            outcome: Ok(Vec::new()),
        });
        assert_eq!(state.error(), Some(NO_BOOKS_MESSAGE));
        assert!(state.books().is_empty());
        assert!(!state.is_loading());
        assert!(derive_visible_list(state.books(), &Filters::default(), SortMode::None).is_empty());
    }

    #[test]
    fn failed_request_reports_generic_error() {
        let (state, request) = loading("dune");
        let decode_failure = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let state = state.resolve(SearchResponse {
            seq: request.seq,
            outcome: Err(FetchError::Decode(decode_failure)),
        });
        assert_eq!(state.error(), Some(FETCH_FAILED_MESSAGE));
        assert!(!state.is_loading());
        assert!(state.books().is_empty());
    }

    #[test]
    fn stale_response_is_discarded() {
        let (state, first) = loading("dune");
        let (state, second) = state.submit_search("emma");
        let second = second.unwrap();

        let state = state.resolve(SearchResponse {
            seq: first.seq,
            outcome: Ok(vec![book("Dune", None, &[])]),
        });
        assert!(state.is_loading());
        assert!(state.books().is_empty());

        let state = state.resolve(SearchResponse {
            seq: second.seq,
            outcome: Ok(vec![book("Emma", None, &[])]),
        });
        assert!(!state.is_loading());
        assert_eq!(state.books()[0].title_or_empty(), "Emma");
    }

    #[test]
    fn sorts_by_title_and_year() {
        let raw = vec![book("B", Some(2000), &[]), book("A", Some(2010), &[])];
        let filters = Filters::default();

        let by_title = derive_visible_list(&raw, &filters, SortMode::TitleAsc);
        assert_eq!(titles(&by_title), vec!["A", "B"]);

        let newest_first = derive_visible_list(&raw, &filters, SortMode::YearDesc);
        assert_eq!(
            newest_first.iter().map(|b| b.year_key()).collect::<Vec<_>>(),
            vec![2010, 2000]
        );

        let oldest_first = derive_visible_list(&raw, &filters, SortMode::YearAsc);
        assert_eq!(titles(&oldest_first), vec!["B", "A"]);

        let z_to_a = derive_visible_list(&raw, &filters, SortMode::TitleDesc);
        assert_eq!(titles(&z_to_a), vec!["B", "A"]);

        let unsorted = derive_visible_list(&raw, &filters, SortMode::None);
        assert_eq!(titles(&unsorted), vec!["B", "A"]);
    }

    #[test]
    fn missing_year_sorts_as_zero_and_ties_stay_stable() {
        let raw = vec![
            book("first", Some(1990), &[]),
            book("undated", None, &[]),
            book("second", Some(1990), &[]),
        ];
        let sorted = derive_visible_list(&raw, &Filters::default(), SortMode::YearDesc);
        assert_eq!(titles(&sorted), vec!["first", "second", "undated"]);

        let sorted = derive_visible_list(&raw, &Filters::default(), SortMode::YearAsc);
        assert_eq!(titles(&sorted), vec!["undated", "first", "second"]);
    }

    #[test]
    fn title_sort_ignores_case_and_puts_untitled_first() {
        let mut untitled = book("", None, &[]);
        untitled.title = None;
        let raw = vec![book("banana", None, &[]), untitled, book("Apple", None, &[])];
        let sorted = derive_visible_list(&raw, &Filters::default(), SortMode::TitleAsc);
        assert_eq!(titles(&sorted), vec!["", "Apple", "banana"]);
    }

    #[test]
    fn titles_differing_only_in_case_put_lowercase_first() {
        let raw = vec![book("A", None, &[]), book("a", None, &[]), book("B", None, &[])];
        let sorted = derive_visible_list(&raw, &Filters::default(), SortMode::TitleAsc);
        assert_eq!(titles(&sorted), vec!["a", "A", "B"]);

        let sorted = derive_visible_list(&raw, &Filters::default(), SortMode::TitleDesc);
        assert_eq!(titles(&sorted), vec!["B", "A", "a"]);
    }

    #[test]
    fn author_filter_is_case_insensitive_substring() {
        let raw = vec![
            book("The Hobbit", Some(1937), &["J.R.R. Tolkien"]),
            book("Dune", Some(1965), &["Frank Herbert"]),
            book("Anonymous", None, &[]),
            book("Letters", None, &["Humphrey Carpenter", "Christopher TOLKIEN"]),
        ];
        let filters = Filters {
            author: "tolkien".into(),
            ..Filters::default()
        };
        let visible = derive_visible_list(&raw, &filters, SortMode::None);
        assert_eq!(titles(&visible), vec!["The Hobbit", "Letters"]);
    }

    #[test]
    fn year_filter_is_exact_and_excludes_undated() {
        let raw = vec![
            book("Dune", Some(1965), &[]),
            book("Undated", None, &[]),
            book("Dune Messiah", Some(1969), &[]),
        ];
        let filters = Filters {
            year: "1965".into(),
            ..Filters::default()
        };
        let visible = derive_visible_list(&raw, &filters, SortMode::None);
        assert_eq!(titles(&visible), vec!["Dune"]);

        let filters = Filters {
            year: "196".into(),
            ..Filters::default()
        };
        assert!(derive_visible_list(&raw, &filters, SortMode::None).is_empty());
    }

    #[test]
    fn derivation_is_idempotent() {
        let raw = vec![
            book("C", Some(1), &["x"]),
            book("A", Some(3), &["x"]),
            book("B", Some(2), &["y"]),
        ];
        let filters = Filters {
            author: "X".into(),
            ..Filters::default()
        };
        let first = derive_visible_list(&raw, &filters, SortMode::TitleDesc);
        let second = derive_visible_list(&raw, &filters, SortMode::TitleDesc);
        assert_eq!(first, second);
        assert_eq!(titles(&first), vec!["C", "A"]);
    }
}
