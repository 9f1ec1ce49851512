//! Outbound email (SMTP) configuration

use serde::{Deserialize, Serialize};

/// SMTP email delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_username: String,

    /// SMTP password
    pub smtp_password: String,

    /// From address used for all outbound mail
    pub from_email: String,

    /// Display name used for all outbound mail
    pub from_name: String,

    /// Timeout for SMTP operations in seconds
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::from("localhost"),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: String::from("no-reply@keygate.dev"),
            from_name: String::from("Keygate"),
            timeout_secs: 10,
        }
    }
}

impl EmailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: std::env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@keygate.dev".to_string()),
            from_name: std::env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Keygate".to_string()),
            timeout_secs: 10,
        }
    }
}
