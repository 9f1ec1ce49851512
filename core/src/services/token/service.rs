//! Main token service implementation

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshToken, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{DomainError, TokenError};
use crate::repositories::RefreshTokenRepository;
use crate::services::password::hash_token;

use super::config::TokenServiceConfig;

/// Service for issuing, verifying and revoking session credentials.
///
/// Access tokens are stateless HS256 JWTs; refresh tokens are opaque
/// random values persisted as SHA-256 hashes with a revocation flag.
pub struct TokenService<R: RefreshTokenRepository> {
    pub(crate) repository: R,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<R: RefreshTokenRepository> TokenService<R> {
    /// Creates a new token service instance
    pub fn new(repository: R, config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            repository,
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Generates a new token pair (access + refresh) for a user
    pub async fn generate_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        let access_token = self.generate_access_token(user)?;
        let refresh_token = self.generate_refresh_token(user.id).await?;

        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Generates an access token
    fn generate_access_token(&self, user: &User) -> Result<String, DomainError> {
        let mut claims =
            Claims::new_access_token(user.id, user.email.clone(), user.email_verified);
        claims.iss = self.config.issuer.clone();
        claims.aud = self.config.audience.clone();
        self.encode_jwt(&claims)
    }

    /// Generates a refresh token and stores its hash
    async fn generate_refresh_token(&self, user_id: Uuid) -> Result<String, DomainError> {
        // Opaque 32-char alphanumeric value; only the hash is persisted
        let token_string: String = {
            let mut rng = rand::thread_rng();
            (0..32)
                .map(|_| {
                    let idx = rng.gen_range(0..62);
                    match idx {
                        0..10 => (b'0' + idx) as char,
                        10..36 => (b'a' + idx - 10) as char,
                        36..62 => (b'A' + idx - 36) as char,
                        _ => unreachable!(),
                    }
                })
                .collect()
        };

        let refresh_token = RefreshToken::new(user_id, hash_token(&token_string));

        self.repository
            .save(refresh_token)
            .await
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;

        Ok(token_string)
    }

    /// Encodes claims into a JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Verifies an access token and returns the claims
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        DomainError::Token(TokenError::TokenExpired)
                    }
                    jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                        DomainError::Token(TokenError::TokenNotYetValid)
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        DomainError::Token(TokenError::InvalidSignature)
                    }
                    _ => DomainError::Token(TokenError::InvalidTokenFormat),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Verifies a refresh token and returns the owning user's ID
    pub async fn verify_refresh_token(&self, token: &str) -> Result<Uuid, DomainError> {
        let token_hash = hash_token(token);

        let refresh_token = self
            .repository
            .find_by_hash(&token_hash)
            .await?
            .ok_or(DomainError::Token(TokenError::InvalidRefreshToken))?;

        if refresh_token.is_expired() {
            return Err(DomainError::Token(TokenError::TokenExpired));
        }

        if refresh_token.is_revoked {
            return Err(DomainError::Token(TokenError::TokenRevoked));
        }

        Ok(refresh_token.user_id)
    }

    /// Refreshes the session with rotation: issues a new pair and
    /// revokes the presented refresh token.
    pub async fn refresh_tokens(
        &self,
        refresh_token: &str,
        user: &User,
    ) -> Result<TokenPair, DomainError> {
        let user_id = self.verify_refresh_token(refresh_token).await?;

        if user_id != user.id {
            return Err(DomainError::Token(TokenError::InvalidRefreshToken));
        }

        let access_token = self.generate_access_token(user)?;
        let new_refresh_token = self.generate_refresh_token(user_id).await?;

        // Rotation: the presented token can never be exchanged again
        let _ = self.repository.revoke(&hash_token(refresh_token)).await;

        Ok(TokenPair::new(access_token, new_refresh_token))
    }

    /// Revokes a specific refresh token (logout).
    ///
    /// An unknown or already-revoked token is a normal rejected input,
    /// reported as `InvalidRefreshToken` rather than a system fault.
    pub async fn revoke_refresh_token(&self, token: &str) -> Result<(), DomainError> {
        let revoked = self.repository.revoke(&hash_token(token)).await?;

        if !revoked {
            return Err(DomainError::Token(TokenError::InvalidRefreshToken));
        }

        tracing::info!(event = "refresh_token_revoked", "Refresh token revoked");
        Ok(())
    }

    /// Revokes every refresh token a user holds
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.repository.revoke_all_for_user(user_id).await
    }

    /// Removes expired refresh tokens from storage
    pub async fn cleanup_expired_tokens(&self) -> Result<usize, DomainError> {
        self.repository.delete_expired().await
    }
}
