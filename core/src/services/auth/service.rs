//! Main authentication service implementation

use std::sync::Arc;

use uuid::Uuid;

use kg_shared::utils::validation::{is_valid_email, normalize_email};

use crate::domain::clock::Clock;
use crate::domain::entities::user::User;
use crate::domain::entities::verification_token::VerificationToken;
use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, DomainError, DomainResult, ValidationError};
use crate::repositories::{RefreshTokenRepository, UserRepository, VerificationTokenRepository};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::TokenService;
use crate::services::verification::{MailerTrait, VerificationService};

use super::config::AuthServiceConfig;

/// Authentication service for the password-account flows: registration,
/// login, password change, session refresh and logout, plus the
/// email-verification and password-reset entry points it shares with
/// the verification service.
pub struct AuthService<U, V, R, M, K>
where
    U: UserRepository,
    V: VerificationTokenRepository,
    R: RefreshTokenRepository,
    M: MailerTrait,
    K: Clock,
{
    /// User repository for account persistence
    user_repository: Arc<U>,
    /// Verification service for token issue/redeem flows
    verification_service: Arc<VerificationService<V, U, M, K>>,
    /// Token service for session credentials
    token_service: Arc<TokenService<R>>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U, V, R, M, K> AuthService<U, V, R, M, K>
where
    U: UserRepository,
    V: VerificationTokenRepository,
    R: RefreshTokenRepository,
    M: MailerTrait,
    K: Clock,
{
    /// Create a new authentication service
    pub fn new(
        user_repository: Arc<U>,
        verification_service: Arc<VerificationService<V, U, M, K>>,
        token_service: Arc<TokenService<R>>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            verification_service,
            token_service,
            config,
        }
    }

    /// Register a new account and dispatch its verification code.
    ///
    /// Account creation and email dispatch form one logical unit: if the
    /// verification email cannot be delivered, the freshly created user
    /// row is deleted before the error propagates, so a failed
    /// registration leaves no account behind.
    ///
    /// # Errors
    /// * `ValidationError::InvalidEmail` - malformed address
    /// * `EmailAlreadyRegistered` - address already taken
    /// * `EmailDeliveryFailed` - verification email undeliverable
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
        photo_url: Option<String>,
    ) -> DomainResult<AuthResponse> {
        if !self.config.allow_registration {
            return Err(DomainError::Unauthorized);
        }

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(DomainError::ValidationErr(ValidationError::InvalidEmail));
        }
        if name.trim().is_empty() {
            return Err(DomainError::ValidationErr(ValidationError::RequiredField {
                field: "name".to_string(),
            }));
        }

        if self.user_repository.exists_by_email(&email).await? {
            return Err(DomainError::Auth(AuthError::EmailAlreadyRegistered));
        }

        let password_hash = match password {
            Some(raw) => Some(hash_password(raw)?),
            None => None,
        };

        let mut user = User::new(email, name.trim().to_string(), password_hash);
        user.photo_url = photo_url;

        // The unique index is the real guard; a concurrent registration
        // surfaces here as Conflict
        let user = match self.user_repository.create(user).await {
            Ok(user) => user,
            Err(DomainError::Conflict { .. }) => {
                return Err(DomainError::Auth(AuthError::EmailAlreadyRegistered));
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self.verification_service.request_email_verification(&user).await {
            // Compensate: registration without a deliverable code is void
            let _ = self.user_repository.delete(user.id).await;
            tracing::warn!(
                user_id = %user.id,
                event = "registration_rolled_back",
                "Registration rolled back after email dispatch failure"
            );
            return Err(e);
        }

        tracing::info!(
            user_id = %user.id,
            event = "user_registered",
            "New user registered, verification code dispatched"
        );

        let tokens = self.token_service.generate_tokens(&user).await?;
        Ok(AuthResponse::from_token_pair(tokens, user))
    }

    /// Validate that an account exists and can login with a password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - no such user (indistinguishable from a
    ///   wrong password downstream)
    /// * `SocialAuthOnly` - account has no usable password
    pub async fn validate_login(&self, email: &str) -> DomainResult<User> {
        let email = normalize_email(email);

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        if !user.has_usable_password() {
            return Err(DomainError::Auth(AuthError::SocialAuthOnly));
        }

        Ok(user)
    }

    /// Authenticate with email and password and issue a session.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResponse> {
        let mut user = self.validate_login(email).await?;

        // validate_login already rejected social-only accounts
        let hash = match user.password_hash.as_deref() {
            Some(hash) => hash,
            None => return Err(DomainError::Auth(AuthError::SocialAuthOnly)),
        };
        if !verify_password(password, hash)? {
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }

        user.update_last_login();
        let user = self.user_repository.update(user).await?;

        tracing::info!(
            user_id = %user.id,
            event = "login_success",
            "Password login succeeded"
        );

        let tokens = self.token_service.generate_tokens(&user).await?;
        Ok(AuthResponse::from_token_pair(tokens, user))
    }

    /// Redeem an email verification code and issue a fresh session.
    pub async fn verify_email(&self, email: &str, code: &str) -> DomainResult<AuthResponse> {
        let user = self.verification_service.confirm_email(email, code).await?;

        let tokens = self.token_service.generate_tokens(&user).await?;
        Ok(AuthResponse::from_token_pair(tokens, user))
    }

    /// Re-issue and re-send the email verification code.
    pub async fn resend_verification(&self, email: &str) -> DomainResult<VerificationToken> {
        let email = normalize_email(email);

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))?;

        self.verification_service
            .request_email_verification(&user)
            .await
    }

    /// Request a password reset token for the account.
    pub async fn forgot_password(&self, email: &str) -> DomainResult<()> {
        self.verification_service
            .request_password_reset(email)
            .await?;
        Ok(())
    }

    /// Redeem a password reset token and store the new password.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let user = self
            .verification_service
            .reset_password(email, token, new_password)
            .await?;

        // A stolen session shouldn't survive a password reset
        let _ = self.token_service.revoke_all_for_user(user.id).await;

        Ok(())
    }

    /// Change the password of an authenticated user.
    ///
    /// # Errors
    /// * `SocialAuthOnly` - social-only accounts cannot set a password
    ///   through this path
    /// * `InvalidCredentials` - old password does not verify
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let mut user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))?;

        let hash = match user.password_hash.as_deref() {
            Some(hash) => hash,
            None => return Err(DomainError::Auth(AuthError::SocialAuthOnly)),
        };

        if !verify_password(old_password, hash)? {
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }

        user.set_password_hash(hash_password(new_password)?);
        self.user_repository.update(user).await?;

        tracing::info!(
            user_id = %user_id,
            event = "password_changed",
            "Password changed"
        );

        Ok(())
    }

    /// Exchange a refresh token for a new session pair (with rotation).
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AuthResponse> {
        let user_id = self.token_service.verify_refresh_token(refresh_token).await?;

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))?;

        let tokens = self
            .token_service
            .refresh_tokens(refresh_token, &user)
            .await?;

        Ok(AuthResponse::from_token_pair(tokens, user))
    }

    /// Logout by revoking the presented refresh token.
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        self.token_service.revoke_refresh_token(refresh_token).await
    }
}
