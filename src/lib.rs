pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod error;

pub use error::{Error, Result};
