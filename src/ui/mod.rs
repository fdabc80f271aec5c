//! User Interface module
//!
//! Terminal front end using ratatui and crossterm.

pub mod app;

pub use app::App;
