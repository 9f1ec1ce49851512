//! # Infrastructure Layer
//!
//! Concrete implementations of the core crate's repository and
//! collaborator traits:
//! - **Database**: MySQL repositories using SQLx
//! - **Email**: SMTP mailer using lettre
//! - **OAuth**: Google userinfo verifier using reqwest

use thiserror::Error;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Email module - SMTP delivery
pub mod email;

/// OAuth module - identity provider verification
pub mod oauth;

/// Errors raised while constructing or operating infrastructure services
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Email service error: {0}")]
    Email(String),
}
