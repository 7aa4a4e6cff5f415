//! Ratatui front-end for the finder. The search box, the filters panel, and
//! the result cards all live on one screen; `app` owns the state and drawing,
//! `terminal` owns the raw-mode event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
