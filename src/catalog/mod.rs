//! Access to the remote book catalog split across logical submodules.

mod client;
mod error;
mod links;

pub use client::{decode_search_response, CatalogClient};
pub use error::FetchError;
pub use links::Links;
