//! Email delivery implementations.

pub mod smtp;

pub use smtp::SmtpMailer;
