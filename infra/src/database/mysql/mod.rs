//! MySQL repository implementations.

pub mod refresh_token_repository_impl;
pub mod user_repository_impl;
pub mod verification_token_repository_impl;

pub use refresh_token_repository_impl::MySqlRefreshTokenRepository;
pub use user_repository_impl::MySqlUserRepository;
pub use verification_token_repository_impl::MySqlVerificationTokenRepository;
