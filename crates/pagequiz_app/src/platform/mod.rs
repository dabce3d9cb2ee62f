mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod persistence;
mod render;

pub use app::{run_app, RunOptions};
pub use logging::LogDestination;
