//! Main social authentication service implementation

use std::sync::Arc;

use kg_shared::utils::validation::{email_local_part, normalize_email};

use crate::domain::entities::user::User;
use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{RefreshTokenRepository, UserRepository};
use crate::services::token::TokenService;

use super::traits::{IdentityProviderTrait, ProviderIdentity};

/// Social authentication service: verifies a provider access token,
/// resolves it to a local account (get-or-create) and issues session
/// credentials.
pub struct SocialAuthService<U, R, P>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    P: IdentityProviderTrait,
{
    /// User repository for account persistence
    user_repository: Arc<U>,
    /// Token service for session credentials
    token_service: Arc<TokenService<R>>,
    /// External identity provider verifier
    provider: Arc<P>,
}

impl<U, R, P> SocialAuthService<U, R, P>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    P: IdentityProviderTrait,
{
    /// Create a new social authentication service
    pub fn new(
        user_repository: Arc<U>,
        token_service: Arc<TokenService<R>>,
        provider: Arc<P>,
    ) -> Self {
        Self {
            user_repository,
            token_service,
            provider,
        }
    }

    /// Authenticate with a provider access token.
    ///
    /// This method:
    /// 1. Verifies the token against the provider's userinfo endpoint;
    ///    any transport or provider failure becomes `ProviderAuthFailed`
    /// 2. Requires a provider-verified email address
    /// 3. Resolves the identity to a local user: an existing account is
    ///    reused unchanged, a missing one is created with no usable
    ///    password and `email_verified = true`
    /// 4. Issues session credentials
    ///
    /// Repeated calls resolving to the same email return the same user:
    /// the `users.email` unique index backstops concurrent first logins,
    /// and a create conflict is answered by re-fetching the row the
    /// concurrent request created.
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<AuthResponse> {
        // Step 1: Verify the token with the provider
        let identity = self
            .provider
            .fetch_identity(access_token)
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    event = "provider_verification_failed",
                    "Identity provider rejected the access token"
                );
                DomainError::Auth(AuthError::ProviderAuthFailed)
            })?;

        // Step 2: Require a verified email from the provider
        let email = normalize_email(&identity.email);
        if email.is_empty() || !identity.verified_email {
            tracing::warn!(
                verified = identity.verified_email,
                event = "provider_identity_rejected",
                "Provider identity missing or unverified email"
            );
            return Err(DomainError::Auth(AuthError::ProviderAuthFailed));
        }

        // Step 3: Resolve to a local account
        let mut user = self.resolve_user(&email, &identity).await?;

        user.update_last_login();
        let user = self.user_repository.update(user).await?;

        // Step 4: Issue session credentials
        let tokens = self.token_service.generate_tokens(&user).await?;

        tracing::info!(
            user_id = %user.id,
            event = "social_login_success",
            "Google login succeeded"
        );

        Ok(AuthResponse::from_token_pair(tokens, user))
    }

    /// Get-or-create the local account for a verified provider email.
    async fn resolve_user(
        &self,
        email: &str,
        identity: &ProviderIdentity,
    ) -> DomainResult<User> {
        // Existing accounts are reused unchanged: no overwrite of the
        // local name or photo with provider data
        if let Some(existing) = self.user_repository.find_by_email(email).await? {
            return Ok(existing);
        }

        let user = User::new_social(
            email.to_string(),
            Self::display_name(email, identity),
            identity.picture.clone(),
        );

        match self.user_repository.create(user).await {
            Ok(created) => {
                tracing::info!(
                    user_id = %created.id,
                    event = "social_user_created",
                    "Created account from Google identity"
                );
                Ok(created)
            }
            // A concurrent first login won the insert; fetch its row
            Err(DomainError::Conflict { .. }) => self
                .user_repository
                .find_by_email(email)
                .await?
                .ok_or_else(|| DomainError::Internal {
                    message: "User vanished after unique-violation on create".to_string(),
                }),
            Err(e) => Err(e),
        }
    }

    /// Provider given/family name, falling back to the email local-part
    /// when both are blank.
    fn display_name(email: &str, identity: &ProviderIdentity) -> String {
        let name = format!(
            "{} {}",
            identity.given_name.as_deref().unwrap_or(""),
            identity.family_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();

        if name.is_empty() {
            email_local_part(email).to_string()
        } else {
            name
        }
    }
}
