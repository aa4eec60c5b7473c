//! Box plot, grouped bar and line charts of social-media engagement.
//!
//! [`summary`] holds the per-group five-number summary; [`chart`] turns
//! summaries and tables into drawable scenes; the rest is the egui app.

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod summary;
pub mod ui;
