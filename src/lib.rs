pub mod adapters;
pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod map;
pub mod query;
pub mod state;
pub mod ui;
