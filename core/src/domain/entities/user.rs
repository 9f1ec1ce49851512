//! User entity representing a registered account in the Keygate system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity representing a registered account.
///
/// The presence of `password_hash` is the discriminator between password
/// accounts and social-only accounts: a user created through Google login
/// carries no hash and can never authenticate with a password until one
/// is explicitly set through the reset flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Unique, case-normalized email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Bcrypt password hash; `None` for social-only accounts
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// Optional profile photo URL
    pub photo_url: Option<String>,

    /// Whether the email address has been verified
    pub email_verified: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,

    /// Timestamp of the user's last login
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new password-account user.
    ///
    /// `email` must already be normalized (lowercased, trimmed) and
    /// `password_hash` already hashed; entities never see raw passwords.
    pub fn new(email: String, name: String, password_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            photo_url: None,
            email_verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Creates a new social-only user from verified provider identity.
    ///
    /// The provider has already verified the address, so the account
    /// starts with `email_verified = true` and no usable password.
    pub fn new_social(email: String, name: String, photo_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash: None,
            photo_url,
            email_verified: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Whether this account can authenticate with a password.
    pub fn has_usable_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Marks the user's email as verified.
    pub fn verify_email(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }

    /// Replaces the stored password hash.
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = Some(password_hash);
        self.updated_at = Utc::now();
    }

    /// Updates the last login timestamp.
    pub fn update_last_login(&mut self) {
        self.last_login_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Sets the profile photo URL.
    pub fn set_photo_url(&mut self, photo_url: Option<String>) {
        self.photo_url = photo_url;
        self.updated_at = Utc::now();
    }
}
