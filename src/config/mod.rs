/// Database configuration and connection management
pub mod database;

/// Pocket template configuration loading from config.toml
pub mod pockets;
