//! Configuration loading for the chapter reader.
//!
//! Settings live in `conf/config.toml` as sectioned tables and are flattened
//! into [`AppConfig`]. Missing or invalid entries fall back to defaults so the
//! reader can always start.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{AppConfig, LogLevel};
