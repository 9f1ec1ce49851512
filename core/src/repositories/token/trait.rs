//! Refresh token repository trait defining the interface for refresh
//! token persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken entity persistence operations
///
/// Revoked rows act as the deny-list: a revoked hash can never again be
/// exchanged for an access token, even before its natural expiry.
///
/// # Security Considerations
/// - Token values are hashed before storage
/// - Expired tokens should be periodically cleaned up
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Save a new refresh token
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Revoke a specific refresh token
    ///
    /// # Returns
    /// * `Ok(true)` - Token was revoked
    /// * `Ok(false)` - Token not found or already revoked
    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Revoke all refresh tokens for a user
    ///
    /// # Returns
    /// * `Ok(count)` - Number of tokens revoked
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Delete expired refresh tokens
    ///
    /// # Returns
    /// * `Ok(count)` - Number of expired tokens deleted
    async fn delete_expired(&self) -> Result<usize, DomainError>;

    /// Check if a token exists and is valid (not expired, not revoked)
    async fn is_token_valid(&self, token_hash: &str) -> Result<bool, DomainError> {
        match self.find_by_hash(token_hash).await? {
            Some(token) => Ok(token.is_valid()),
            None => Ok(false),
        }
    }
}
