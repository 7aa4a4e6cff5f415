use thiserror::Error;

/// Ways a catalog search can fail. The user only ever sees a generic message;
/// the variant and its source are kept for the log.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Building, sending, or reading the HTTP exchange failed.
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The body was not the JSON document we expect.
    #[error("catalog response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}
