//! MySQL implementation of the UserRepository trait.
//!
//! Schema:
//!
//! ```sql
//! CREATE TABLE users (
//!     id            CHAR(36) PRIMARY KEY,
//!     email         VARCHAR(255) NOT NULL,
//!     name          VARCHAR(255) NOT NULL,
//!     password_hash VARCHAR(255) NULL,
//!     photo_url     VARCHAR(500) NULL,
//!     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at    TIMESTAMP(6) NOT NULL,
//!     updated_at    TIMESTAMP(6) NOT NULL,
//!     last_login_at TIMESTAMP(6) NULL,
//!     UNIQUE KEY uq_users_email (email)
//! );
//! ```
//!
//! The unique key on `email` is the authoritative duplicate guard; a
//! violation surfaces as `DomainError::Conflict` for get-or-create
//! callers to retry as a fetch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use kg_core::domain::entities::user::User;
use kg_core::errors::DomainError;
use kg_core::repositories::UserRepository;

/// MySQL duplicate-key error number
const ER_DUP_ENTRY: &str = "1062";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?;

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::Internal { message: format!("Invalid user UUID: {}", e) })?,
            email: row
                .try_get("email")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get email: {}", e) })?,
            name: row
                .try_get("name")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get name: {}", e) })?,
            password_hash: row.try_get("password_hash").map_err(|e| DomainError::Internal {
                message: format!("Failed to get password_hash: {}", e),
            })?,
            photo_url: row.try_get("photo_url").map_err(|e| DomainError::Internal {
                message: format!("Failed to get photo_url: {}", e),
            })?,
            email_verified: row.try_get("email_verified").map_err(|e| DomainError::Internal {
                message: format!("Failed to get email_verified: {}", e),
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get updated_at: {}", e),
                })?,
            last_login_at: row.try_get("last_login_at").map_err(|e| DomainError::Internal {
                message: format!("Failed to get last_login_at: {}", e),
            })?,
        })
    }

    /// Detect a MySQL unique-key violation
    fn is_duplicate_key(error: &sqlx::Error) -> bool {
        match error {
            sqlx::Error::Database(db_err) => db_err
                .code()
                .map(|code| code == ER_DUP_ENTRY)
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = r#"
            SELECT id, email, name, password_hash, photo_url,
                   email_verified, created_at, updated_at, last_login_at
            FROM users
            WHERE email = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find user: {}", e) })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = r#"
            SELECT id, email, name, password_hash, photo_url,
                   email_verified, created_at, updated_at, last_login_at
            FROM users
            WHERE id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find user: {}", e) })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (
                id, email, name, password_hash, photo_url,
                email_verified, created_at, updated_at, last_login_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(&user.photo_url)
            .bind(user.email_verified)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.last_login_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if Self::is_duplicate_key(&e) {
                    DomainError::Conflict {
                        resource: "users.email".to_string(),
                    }
                } else {
                    DomainError::Internal {
                        message: format!("Failed to create user: {}", e),
                    }
                }
            })?;

        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            UPDATE users
            SET email = ?, name = ?, password_hash = ?, photo_url = ?,
                email_verified = ?, updated_at = ?, last_login_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(&user.photo_url)
            .bind(user.email_verified)
            .bind(user.updated_at)
            .bind(user.last_login_at)
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to update user: {}", e) })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to delete user: {}", e) })?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?) AS present")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to check user existence: {}", e),
            })?;

        let present: i8 = row.try_get("present").map_err(|e| DomainError::Internal {
            message: format!("Failed to read existence result: {}", e),
        })?;

        Ok(present == 1)
    }
}
