// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod strategy;

// Re-export commonly used types
pub use config::BotConfig;
pub use error::OrbError;
pub use models::*;
pub use pipeline::{OrbBot, RunOutcome};
pub use strategy::Strategy;

// Error handling
pub type Result<T> = std::result::Result<T, OrbError>;
