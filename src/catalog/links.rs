use crate::config::Config;
use crate::models::Book;

/// Builds the outbound links shown on a result card: the cover image and the
/// catalog detail page.
#[derive(Debug, Clone)]
pub struct Links {
    covers_url: String,
    details_url: String,
    placeholder_cover: String,
}

impl Links {
    pub fn from_config(config: &Config) -> Self {
        Self {
            covers_url: config.covers_url.trim_end_matches('/').to_string(),
            details_url: config.details_url.trim_end_matches('/').to_string(),
            placeholder_cover: config.placeholder_cover.clone(),
        }
    }

    /// Medium-size cover for the book, or the placeholder image when the
    /// catalog has no cover id.
    pub fn cover_url(&self, book: &Book) -> String {
        match book.cover_id() {
            Some(id) => format!("{}/{}-M.jpg", self.covers_url, id),
            None => self.placeholder_cover.clone(),
        }
    }

    /// Detail page for the book. `None` when the document carries no key.
    pub fn detail_url(&self, book: &Book) -> Option<String> {
        book.key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| format!("{}{}", self.details_url, key))
    }
}

impl Default for Links {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
