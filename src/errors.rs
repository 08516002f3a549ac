//! Unified error types and result handling for the crate.

use thiserror::Error;

/// Unified error type covering configuration, storage, and domain failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation failed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying store failure; propagated unchanged to the caller
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (e.g., reading config.toml)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A pocket id did not resolve to an active pocket
    #[error("Pocket not found: {id}")]
    PocketNotFound {
        /// The id that failed to resolve
        id: i64,
    },

    /// A template id did not resolve to an active template pocket.
    /// Distinct from [`Error::PocketNotFound`] so callers can tell
    /// "nothing to do" apart from "system broken".
    #[error("Template not found or inactive: {id}")]
    TemplateNotFound {
        /// The id that failed to resolve
        id: i64,
    },

    /// An amount failed validation (negative, zero where disallowed, or non-finite)
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// A month string was not valid `YYYY-MM`
    #[error("Invalid month: {value:?} (expected YYYY-MM)")]
    InvalidMonth {
        /// The offending input
        value: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
