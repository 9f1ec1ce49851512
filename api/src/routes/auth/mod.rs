//! Authentication route handlers
//!
//! This module contains all authentication-related endpoints:
//! - Registration and password login
//! - Email verification (code dispatch and redemption)
//! - Password reset (token dispatch and redemption) and password change
//! - Google social login
//! - Session refresh and logout

pub mod change_password;
pub mod forgot_password;
pub mod google;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod reset_password;
pub mod verify_email;

use std::sync::Arc;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::auth::AuthService;
use kg_core::services::social::{IdentityProviderTrait, SocialAuthService};
use kg_core::services::verification::MailerTrait;

/// Application state that holds the shared services
pub struct AppState<U, V, R, M, P, K>
where
    U: UserRepository,
    V: VerificationTokenRepository,
    R: RefreshTokenRepository,
    M: MailerTrait,
    P: IdentityProviderTrait,
    K: Clock,
{
    pub auth_service: Arc<AuthService<U, V, R, M, K>>,
    pub social_service: Arc<SocialAuthService<U, R, P>>,
}

impl<U, V, R, M, P, K> AppState<U, V, R, M, P, K>
where
    U: UserRepository,
    V: VerificationTokenRepository,
    R: RefreshTokenRepository,
    M: MailerTrait,
    P: IdentityProviderTrait,
    K: Clock,
{
    pub fn new(
        auth_service: Arc<AuthService<U, V, R, M, K>>,
        social_service: Arc<SocialAuthService<U, R, P>>,
    ) -> Self {
        Self {
            auth_service,
            social_service,
        }
    }
}
