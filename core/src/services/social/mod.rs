//! Social (Google OAuth) authentication: external identity verification
//! and idempotent account resolution.

pub mod service;
pub mod traits;

pub use service::SocialAuthService;
pub use traits::{IdentityProviderTrait, ProviderIdentity};
