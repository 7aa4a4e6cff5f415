//! Core library surface for the Book Finder TUI application.
//!
//! The search reducer and the visible-list derivation are plain functions over
//! plain data so they can be driven without a terminal; the `ui` module wires
//! them to Ratatui and the `catalog` module to the remote search API.
pub mod catalog;
pub mod config;
pub mod logging;
pub mod models;
pub mod search;
pub mod ui;

/// Remote catalog access and link building.
pub use catalog::{CatalogClient, FetchError, Links};

pub use config::Config;

/// The domain types the other layers pass around.
pub use models::{Book, Filters, SortMode};

pub use search::{derive_visible_list, SearchRequest, SearchResponse, SearchState};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
