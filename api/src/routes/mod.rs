//! Route handlers.

pub mod auth;

pub use auth::AppState;
