//! Verification token repository trait.
//!
//! The store guarantees two invariants that callers must never be able
//! to observe half-applied:
//!
//! 1. At most one unexpired, unused token per `(user, purpose)` —
//!    enforced by `issue`, which supersedes prior unused tokens and
//!    inserts the new one in a single atomic unit.
//! 2. Exactly-once redemption — `redeem` flips `is_used` and applies the
//!    token's side effect to the user row in the same atomic unit.
//!
//! Tokens are never deleted; consumed and superseded rows remain as an
//! audit trail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::verification_token::{TokenPurpose, VerificationToken};
use crate::errors::DomainError;

/// The user-visible effect a redeemed token applies.
///
/// Keeping the effect inside the repository call lets the SQL
/// implementation commit the token flip and the user mutation in one
/// transaction without a separate unit-of-work abstraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionEffect {
    /// Mark the user's email address verified
    MarkEmailVerified { user_id: Uuid },
    /// Store a freshly hashed password on the user
    SetPasswordHash {
        user_id: Uuid,
        password_hash: String,
    },
}

/// Repository trait for verification token persistence
#[async_trait]
pub trait VerificationTokenRepository: Send + Sync {
    /// Persist a newly issued token, superseding its predecessors.
    ///
    /// Marks every unused token of the same `(user, purpose)` as used,
    /// then inserts `token` — both inside one atomic unit, so a crash
    /// can never leave two simultaneously valid tokens of one purpose.
    async fn issue(&self, token: VerificationToken) -> Result<VerificationToken, DomainError>;

    /// Find the unused token matching `(user, value, purpose)`.
    ///
    /// Expiry is deliberately not filtered here; the caller evaluates
    /// the validity predicate against its injected clock.
    async fn find_active(
        &self,
        user_id: Uuid,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<VerificationToken>, DomainError>;

    /// Consume a token and apply its effect, atomically.
    ///
    /// # Returns
    /// * `Ok(())` - Token flipped to used and effect applied
    /// * `Err(DomainError::NotFound)` - No such unused token (already
    ///   consumed by a concurrent redemption, or never issued)
    async fn redeem(&self, token_id: Uuid, effect: RedemptionEffect) -> Result<(), DomainError>;

    /// Count unused, unexpired tokens for `(user, purpose)` as of `now`.
    async fn count_active(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;
}
