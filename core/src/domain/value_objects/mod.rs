//! Value objects produced by the domain services.

pub mod auth_response;

pub use auth_response::AuthResponse;
