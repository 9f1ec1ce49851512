//! Mock implementation of RefreshTokenRepository for testing

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::trait_::RefreshTokenRepository;

/// Mock refresh token repository for testing
pub struct MockRefreshTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl MockRefreshTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockRefreshTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Conflict {
                resource: "refresh_tokens.token_hash".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_hash) {
            Some(token) if !token.is_revoked => {
                token.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.is_revoked {
                token.revoke();
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let now = Utc::now();
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at > now);
        Ok(before - tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_is_idempotent_but_reports_once() {
        let repo = MockRefreshTokenRepository::new();
        let token = RefreshToken::new(Uuid::new_v4(), "hash-a".to_string());
        repo.save(token).await.unwrap();

        assert!(repo.revoke("hash-a").await.unwrap());
        // Already revoked: reported as not-revoked-now
        assert!(!repo.revoke("hash-a").await.unwrap());
        // Unknown hash
        assert!(!repo.revoke("hash-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_all_for_user() {
        let repo = MockRefreshTokenRepository::new();
        let user_id = Uuid::new_v4();
        repo.save(RefreshToken::new(user_id, "h1".to_string()))
            .await
            .unwrap();
        repo.save(RefreshToken::new(user_id, "h2".to_string()))
            .await
            .unwrap();
        repo.save(RefreshToken::new(Uuid::new_v4(), "h3".to_string()))
            .await
            .unwrap();

        assert_eq!(repo.revoke_all_for_user(user_id).await.unwrap(), 2);
        assert!(!repo.is_token_valid("h1").await.unwrap());
        assert!(repo.is_token_valid("h3").await.unwrap());
    }
}
