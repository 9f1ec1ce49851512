//! MySQL implementation of the VerificationTokenRepository trait.
//!
//! Schema:
//!
//! ```sql
//! CREATE TABLE verification_tokens (
//!     id         CHAR(36) PRIMARY KEY,
//!     user_id    CHAR(36) NOT NULL,
//!     token      VARCHAR(64) NOT NULL,
//!     purpose    VARCHAR(20) NOT NULL,
//!     created_at TIMESTAMP(6) NOT NULL,
//!     expires_at TIMESTAMP(6) NOT NULL,
//!     is_used    BOOLEAN NOT NULL DEFAULT FALSE,
//!     KEY idx_tokens_lookup (user_id, token, purpose, is_used),
//!     CONSTRAINT fk_tokens_user FOREIGN KEY (user_id)
//!         REFERENCES users (id) ON DELETE CASCADE
//! );
//! ```
//!
//! Rows are never deleted; superseded and consumed tokens stay as an
//! audit trail. `issue` and `redeem` each run inside one transaction so
//! a crash can neither leave two live tokens of a purpose nor a
//! consumed token whose effect was not applied.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use kg_core::domain::entities::verification_token::{TokenPurpose, VerificationToken};
use kg_core::errors::DomainError;
use kg_core::repositories::{RedemptionEffect, VerificationTokenRepository};

/// MySQL implementation of VerificationTokenRepository
pub struct MySqlVerificationTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationTokenRepository {
    /// Create a new MySQL verification token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to VerificationToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<VerificationToken, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?;
        let user_id: String = row.try_get("user_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get user_id: {}", e),
        })?;
        let purpose: String = row.try_get("purpose").map_err(|e| DomainError::Internal {
            message: format!("Failed to get purpose: {}", e),
        })?;

        Ok(VerificationToken {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::Internal { message: format!("Invalid token UUID: {}", e) })?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DomainError::Internal { message: format!("Invalid user UUID: {}", e) })?,
            token: row
                .try_get("token")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get token: {}", e) })?,
            purpose: TokenPurpose::parse(&purpose).ok_or_else(|| DomainError::Internal {
                message: format!("Unknown token purpose: {}", purpose),
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            is_used: row
                .try_get("is_used")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get is_used: {}", e) })?,
        })
    }
}

#[async_trait]
impl VerificationTokenRepository for MySqlVerificationTokenRepository {
    async fn issue(&self, token: VerificationToken) -> Result<VerificationToken, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to begin transaction: {}", e),
        })?;

        // Supersede every unused token of the same (user, purpose)
        sqlx::query(
            r#"
            UPDATE verification_tokens
            SET is_used = TRUE
            WHERE user_id = ? AND purpose = ? AND is_used = FALSE
            "#,
        )
        .bind(token.user_id.to_string())
        .bind(token.purpose.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to supersede prior tokens: {}", e),
        })?;

        sqlx::query(
            r#"
            INSERT INTO verification_tokens (
                id, user_id, token, purpose, created_at, expires_at, is_used
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.token)
        .bind(token.purpose.as_str())
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.is_used)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to insert verification token: {}", e),
        })?;

        tx.commit().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to commit token issuance: {}", e),
        })?;

        Ok(token)
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<VerificationToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, token, purpose, created_at, expires_at, is_used
            FROM verification_tokens
            WHERE user_id = ? AND token = ? AND purpose = ? AND is_used = FALSE
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(user_id.to_string())
            .bind(token)
            .bind(purpose.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find verification token: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn redeem(&self, token_id: Uuid, effect: RedemptionEffect) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to begin transaction: {}", e),
        })?;

        // The is_used guard makes redemption exactly-once even when two
        // requests race on the same row
        let flipped = sqlx::query(
            r#"
            UPDATE verification_tokens
            SET is_used = TRUE
            WHERE id = ? AND is_used = FALSE
            "#,
        )
        .bind(token_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to consume verification token: {}", e),
        })?;

        if flipped.rows_affected() == 0 {
            // Roll back implicitly by dropping the transaction
            return Err(DomainError::NotFound {
                resource: "VerificationToken".to_string(),
            });
        }

        let applied = match effect {
            RedemptionEffect::MarkEmailVerified { user_id } => {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET email_verified = TRUE, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(Utc::now())
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await
            }
            RedemptionEffect::SetPasswordHash {
                user_id,
                password_hash,
            } => {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET password_hash = ?, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(password_hash)
                .bind(Utc::now())
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await
            }
        }
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to apply redemption effect: {}", e),
        })?;

        if applied.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }

        tx.commit().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to commit redemption: {}", e),
        })?;

        Ok(())
    }

    async fn count_active(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS live
            FROM verification_tokens
            WHERE user_id = ? AND purpose = ? AND is_used = FALSE AND expires_at > ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(purpose.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Internal { message: format!("Failed to count tokens: {}", e) })?;

        let live: i64 = row
            .try_get("live")
            .map_err(|e| DomainError::Internal { message: format!("Failed to read count: {}", e) })?;

        Ok(live as usize)
    }
}
