//! Shared utilities and common types for the Keygate backend
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Response structures
//! - Utility functions (email normalization and validation)

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{AuthConfig, DatabaseConfig, EmailConfig, JwtConfig, ServerConfig};
pub use types::response::ErrorResponse;
pub use utils::validation;
