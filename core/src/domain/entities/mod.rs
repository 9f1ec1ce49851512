//! Domain entities for users, verification tokens and session tokens.

pub mod token;
pub mod user;
pub mod verification_token;

pub use token::{Claims, RefreshToken, TokenPair};
pub use user::User;
pub use verification_token::{TokenPurpose, VerificationToken};
