//! Shared configuration and utilities for the Chatterbox auth backend
//!
//! This crate provides common functionality used across the server crates:
//! - Configuration types (secrets, TTLs, database, cache, logging)
//! - Utility functions (email normalisation, validation and log masking)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, LogFormat,
    LoggingConfig, RevocationCheckPolicy,
};
pub use utils::email;
