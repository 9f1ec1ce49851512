//! Main verification service implementation

use std::sync::Arc;

use kg_shared::utils::validation::normalize_email;

use crate::domain::clock::Clock;
use crate::domain::entities::user::User;
use crate::domain::entities::verification_token::{TokenPurpose, VerificationToken};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{RedemptionEffect, UserRepository, VerificationTokenRepository};
use crate::services::password::hash_password;

use super::config::VerificationServiceConfig;
use super::traits::MailerTrait;

/// Verification service orchestrating the issue → deliver → redeem
/// lifecycle for email verification codes and password reset tokens.
pub struct VerificationService<V, U, M, K>
where
    V: VerificationTokenRepository,
    U: UserRepository,
    M: MailerTrait,
    K: Clock,
{
    /// Verification token store
    token_repository: Arc<V>,
    /// User store
    user_repository: Arc<U>,
    /// Outbound email collaborator
    mailer: Arc<M>,
    /// Time source for expiry decisions
    clock: Arc<K>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<V, U, M, K> VerificationService<V, U, M, K>
where
    V: VerificationTokenRepository,
    U: UserRepository,
    M: MailerTrait,
    K: Clock,
{
    /// Create a new verification service
    pub fn new(
        token_repository: Arc<V>,
        user_repository: Arc<U>,
        mailer: Arc<M>,
        clock: Arc<K>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            token_repository,
            user_repository,
            mailer,
            clock,
            config,
        }
    }

    /// Issue a fresh token for `(user, purpose)`.
    ///
    /// The store supersedes every prior unused token of the same purpose
    /// in the same atomic unit, so after this call exactly one token of
    /// the purpose is live for the user.
    pub async fn issue_token(
        &self,
        user_id: uuid::Uuid,
        purpose: TokenPurpose,
    ) -> DomainResult<VerificationToken> {
        let token = VerificationToken::new(user_id, purpose, self.clock.now());

        let token = self.token_repository.issue(token).await?;

        tracing::info!(
            user_id = %user_id,
            purpose = purpose.as_str(),
            token_id = %token.id,
            event = "verification_token_issued",
            "Issued verification token, prior unused tokens superseded"
        );

        Ok(token)
    }

    /// Issue and deliver an email verification code.
    ///
    /// # Errors
    /// * `EmailAlreadyVerified` - the user's email is already verified
    /// * `EmailDeliveryFailed` - the mailer rejected the dispatch; the
    ///   issued token stays superseded-but-unredeemable and the caller
    ///   decides whether to compensate (registration deletes the user)
    pub async fn request_email_verification(
        &self,
        user: &User,
    ) -> DomainResult<VerificationToken> {
        if user.email_verified {
            return Err(DomainError::Auth(AuthError::EmailAlreadyVerified));
        }

        let token = self
            .issue_token(user.id, TokenPurpose::EmailVerification)
            .await?;

        self.mailer
            .send_verification_email(&user.email, &user.name, &token.token)
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %user.id,
                    error = %e,
                    event = "verification_email_failed",
                    "Failed to deliver verification email"
                );
                DomainError::Auth(AuthError::EmailDeliveryFailed)
            })?;

        Ok(token)
    }

    /// Redeem an email verification code.
    ///
    /// User lookup miss, token miss and expired token all collapse to
    /// `InvalidVerificationCode`: the caller cannot distinguish "wrong
    /// code" from "no such account". The verified flag and the token's
    /// used flag commit together.
    pub async fn confirm_email(&self, email: &str, code: &str) -> DomainResult<User> {
        let email = normalize_email(email);

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidVerificationCode))?;

        if user.email_verified {
            return Err(DomainError::Auth(AuthError::EmailAlreadyVerified));
        }

        let token = self
            .token_repository
            .find_active(user.id, code, TokenPurpose::EmailVerification)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidVerificationCode))?;

        if !token.is_valid(self.clock.now()) {
            tracing::warn!(
                user_id = %user.id,
                token_id = %token.id,
                event = "verification_code_expired",
                "Expired verification code presented"
            );
            return Err(DomainError::Auth(AuthError::InvalidVerificationCode));
        }

        self.token_repository
            .redeem(
                token.id,
                RedemptionEffect::MarkEmailVerified { user_id: user.id },
            )
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent redemption
                DomainError::NotFound { .. } => {
                    DomainError::Auth(AuthError::InvalidVerificationCode)
                }
                other => other,
            })?;

        tracing::info!(
            user_id = %user.id,
            event = "email_verified",
            "Email address verified"
        );

        self.user_repository
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| DomainError::Internal {
                message: "User disappeared during email verification".to_string(),
            })
    }

    /// Issue and deliver a password reset token.
    ///
    /// # Errors
    /// * `UserNotFound` - no account with that email
    /// * `SocialAuthOnly` - the account has no usable password
    /// * `EmailDeliveryFailed` - the mailer rejected the dispatch
    pub async fn request_password_reset(&self, email: &str) -> DomainResult<VerificationToken> {
        let email = normalize_email(email);

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))?;

        if !user.has_usable_password() {
            return Err(DomainError::Auth(AuthError::SocialAuthOnly));
        }

        let token = self
            .issue_token(user.id, TokenPurpose::PasswordReset)
            .await?;

        self.mailer
            .send_password_reset_email(
                &user.email,
                &user.name,
                &token.token,
                self.config.reset_url.as_deref(),
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %user.id,
                    error = %e,
                    event = "reset_email_failed",
                    "Failed to deliver password reset email"
                );
                DomainError::Auth(AuthError::EmailDeliveryFailed)
            })?;

        Ok(token)
    }

    /// Redeem a password reset token and store the new password.
    ///
    /// User miss, token miss and invalid predicate all collapse to
    /// `InvalidOrExpiredToken`; the hash write and the token's used flag
    /// commit together.
    pub async fn reset_password(
        &self,
        email: &str,
        token_value: &str,
        new_password: &str,
    ) -> DomainResult<User> {
        let email = normalize_email(email);

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidResetToken))?;

        let token = self
            .token_repository
            .find_active(user.id, token_value, TokenPurpose::PasswordReset)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidResetToken))?;

        if !token.is_valid(self.clock.now()) {
            return Err(DomainError::Auth(AuthError::InvalidResetToken));
        }

        let password_hash = hash_password(new_password)?;

        self.token_repository
            .redeem(
                token.id,
                RedemptionEffect::SetPasswordHash {
                    user_id: user.id,
                    password_hash,
                },
            )
            .await
            .map_err(|e| match e {
                DomainError::NotFound { .. } => DomainError::Auth(AuthError::InvalidResetToken),
                other => other,
            })?;

        tracing::info!(
            user_id = %user.id,
            event = "password_reset",
            "Password reset completed"
        );

        self.user_repository
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| DomainError::Internal {
                message: "User disappeared during password reset".to_string(),
            })
    }
}
