//! Unified verification token entity for email verification and
//! password reset.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the numeric email verification code
pub const EMAIL_CODE_LENGTH: usize = 4;

/// Email verification codes expire after 15 minutes
pub const EMAIL_CODE_EXPIRY_MINUTES: i64 = 15;

/// Password reset tokens expire after 60 minutes
pub const RESET_TOKEN_EXPIRY_MINUTES: i64 = 60;

/// Entropy of the password reset token in bytes
pub const RESET_TOKEN_BYTES: usize = 32;

/// Purpose of a verification token, governing its value format, expiry
/// window and redemption semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// 4-digit numeric code delivered by email
    EmailVerification,
    /// High-entropy URL-safe token delivered by email
    PasswordReset,
}

impl TokenPurpose {
    /// Expiry window for tokens of this purpose.
    pub fn expiry_window(&self) -> Duration {
        match self {
            TokenPurpose::EmailVerification => Duration::minutes(EMAIL_CODE_EXPIRY_MINUTES),
            TokenPurpose::PasswordReset => Duration::minutes(RESET_TOKEN_EXPIRY_MINUTES),
        }
    }

    /// Database discriminator string for this purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }

    /// Parse the database discriminator string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "email_verification" => Some(TokenPurpose::EmailVerification),
            "password_reset" => Some(TokenPurpose::PasswordReset),
            _ => None,
        }
    }
}

/// Verification token entity.
///
/// Tokens are never deleted: superseded and consumed tokens stay in
/// storage with `is_used = true` as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken {
    /// Unique identifier for the token row
    pub id: Uuid,

    /// User this token was issued to
    pub user_id: Uuid,

    /// The token value presented back by the user
    pub token: String,

    /// What this token can be redeemed for
    pub purpose: TokenPurpose,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been consumed or superseded
    pub is_used: bool,
}

impl VerificationToken {
    /// Creates a new token with the purpose-appropriate value and expiry.
    ///
    /// `now` comes from the caller's clock so expiry arithmetic stays
    /// deterministic under test.
    pub fn new(user_id: Uuid, purpose: TokenPurpose, now: DateTime<Utc>) -> Self {
        let token = match purpose {
            TokenPurpose::EmailVerification => Self::generate_numeric_code(),
            TokenPurpose::PasswordReset => Self::generate_secure_token(),
        };

        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            purpose,
            created_at: now,
            expires_at: now + purpose.expiry_window(),
            is_used: false,
        }
    }

    /// Generates a 4-digit numeric code in `1000..=9999`.
    ///
    /// The 9000-value space is not collision-free; the compound
    /// `(user, token, purpose)` lookup makes cross-user collisions
    /// harmless, and a within-user reissue collision is an accepted
    /// low-probability case.
    pub fn generate_numeric_code() -> String {
        let code: u32 = OsRng.gen_range(1000..10000);
        code.to_string()
    }

    /// Generates a URL-safe token with 32 bytes of CSPRNG entropy.
    pub fn generate_secure_token() -> String {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Checks if the token has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Validity predicate: unused and not yet expired.
    ///
    /// Both mutations are one-way, so validity can only ever go from
    /// `true` to `false`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && now < self.expires_at
    }

    /// Marks the token as consumed or superseded.
    pub fn mark_used(&mut self) {
        self.is_used = true;
    }
}
