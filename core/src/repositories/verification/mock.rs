//! Mock implementation of VerificationTokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::verification_token::{TokenPurpose, VerificationToken};
use crate::errors::DomainError;
use crate::repositories::user::mock::UserStore;

use super::trait_::{RedemptionEffect, VerificationTokenRepository};

/// Mock verification token repository for testing.
///
/// Holds a handle to the mock user store so `redeem` can apply its
/// effect to the same user rows the `MockUserRepository` serves —
/// matching the SQL implementation, where both repositories write to
/// one database inside one transaction.
pub struct MockVerificationTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, VerificationToken>>>,
    users: UserStore,
}

impl MockVerificationTokenRepository {
    /// Create a mock sharing the given user store
    pub fn new(users: UserStore) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            users,
        }
    }

    /// All stored rows for a user, newest first (audit-trail inspection)
    pub async fn all_for_user(&self, user_id: Uuid) -> Vec<VerificationToken> {
        let tokens = self.tokens.read().await;
        let mut rows: Vec<VerificationToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl VerificationTokenRepository for MockVerificationTokenRepository {
    async fn issue(&self, token: VerificationToken) -> Result<VerificationToken, DomainError> {
        // Supersede and insert under one lock: the mock's atomic unit
        let mut tokens = self.tokens.write().await;

        for existing in tokens.values_mut() {
            if existing.user_id == token.user_id
                && existing.purpose == token.purpose
                && !existing.is_used
            {
                existing.is_used = true;
            }
        }

        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<VerificationToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .find(|t| {
                t.user_id == user_id && t.token == token && t.purpose == purpose && !t.is_used
            })
            .cloned())
    }

    async fn redeem(&self, token_id: Uuid, effect: RedemptionEffect) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;

        let token = tokens
            .get_mut(&token_id)
            .filter(|t| !t.is_used)
            .ok_or_else(|| DomainError::NotFound {
                resource: "VerificationToken".to_string(),
            })?;
        token.is_used = true;

        let mut users = self.users.write().await;
        match effect {
            RedemptionEffect::MarkEmailVerified { user_id } => {
                let user = users.get_mut(&user_id).ok_or_else(|| DomainError::NotFound {
                    resource: "User".to_string(),
                })?;
                user.verify_email();
            }
            RedemptionEffect::SetPasswordHash {
                user_id,
                password_hash,
            } => {
                let user = users.get_mut(&user_id).ok_or_else(|| DomainError::NotFound {
                    resource: "User".to_string(),
                })?;
                user.set_password_hash(password_hash);
            }
        }

        Ok(())
    }

    async fn count_active(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.purpose == purpose && t.is_valid(now))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user::mock::MockUserRepository;
    use crate::repositories::user::r#trait::UserRepository;
    use crate::domain::entities::user::User;

    fn fixtures() -> (MockUserRepository, MockVerificationTokenRepository) {
        let users = MockUserRepository::new();
        let tokens = MockVerificationTokenRepository::new(users.store());
        (users, tokens)
    }

    #[tokio::test]
    async fn test_issue_supersedes_prior_unused_tokens() {
        let (_, repo) = fixtures();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let first = repo
            .issue(VerificationToken::new(
                user_id,
                TokenPurpose::EmailVerification,
                now,
            ))
            .await
            .unwrap();
        let second = repo
            .issue(VerificationToken::new(
                user_id,
                TokenPurpose::EmailVerification,
                now,
            ))
            .await
            .unwrap();

        // Only the newest token is live
        assert_eq!(
            repo.count_active(user_id, TokenPurpose::EmailVerification, now)
                .await
                .unwrap(),
            1
        );
        assert!(repo
            .find_active(user_id, &first.token, TokenPurpose::EmailVerification)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_active(user_id, &second.token, TokenPurpose::EmailVerification)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_issue_leaves_other_purposes_untouched() {
        let (_, repo) = fixtures();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let reset = repo
            .issue(VerificationToken::new(
                user_id,
                TokenPurpose::PasswordReset,
                now,
            ))
            .await
            .unwrap();
        repo.issue(VerificationToken::new(
            user_id,
            TokenPurpose::EmailVerification,
            now,
        ))
        .await
        .unwrap();

        assert!(repo
            .find_active(user_id, &reset.token, TokenPurpose::PasswordReset)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_redeem_is_exactly_once() {
        let (users, repo) = fixtures();
        let user = users
            .create(User::new("a@b.co".to_string(), "A".to_string(), None))
            .await
            .unwrap();

        let token = repo
            .issue(VerificationToken::new(
                user.id,
                TokenPurpose::EmailVerification,
                Utc::now(),
            ))
            .await
            .unwrap();

        repo.redeem(
            token.id,
            RedemptionEffect::MarkEmailVerified { user_id: user.id },
        )
        .await
        .unwrap();

        assert!(users.find_by_id(user.id).await.unwrap().unwrap().email_verified);

        // Second redemption of the same row fails
        let err = repo
            .redeem(
                token.id,
                RedemptionEffect::MarkEmailVerified { user_id: user.id },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_redeem_applies_password_hash() {
        let (users, repo) = fixtures();
        let user = users
            .create(User::new(
                "b@c.co".to_string(),
                "B".to_string(),
                Some("$2b$12$old".to_string()),
            ))
            .await
            .unwrap();

        let token = repo
            .issue(VerificationToken::new(
                user.id,
                TokenPurpose::PasswordReset,
                Utc::now(),
            ))
            .await
            .unwrap();

        repo.redeem(
            token.id,
            RedemptionEffect::SetPasswordHash {
                user_id: user.id,
                password_hash: "$2b$12$new".to_string(),
            },
        )
        .await
        .unwrap();

        let stored = users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash.as_deref(), Some("$2b$12$new"));
    }
}
