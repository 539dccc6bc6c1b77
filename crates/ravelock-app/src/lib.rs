//! Ravelock command-line shell
//!
//! Loads canvases from storage, runs lock-group operations on them and saves
//! the result.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Command};
pub use commands::run;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
