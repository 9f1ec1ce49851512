//! Domain-specific error types for authentication and related operations
//!
//! This module defines error types for authentication, token management,
//! and validation. User-facing message text and HTTP status codes are
//! owned by the presentation layer; these variants carry exactly as much
//! detail as a caller may safely see.

use thiserror::Error;

/// Authentication-related errors
///
/// Verification failures are deliberately coarse: wrong code, expired
/// code and mismatched user collapse into one variant per flow so the
/// error channel cannot be used to probe which accounts exist.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("This account uses social authentication")]
    SocialAuthOnly,

    #[error("Invalid or expired verification code")]
    InvalidVerificationCode,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Email is already verified")]
    EmailAlreadyVerified,

    #[error("User with this email does not exist")]
    UserNotFound,

    #[error("This email is already in use")]
    EmailAlreadyRegistered,

    #[error("Identity provider rejected the access token")]
    ProviderAuthFailed,

    #[error("Email delivery failed")]
    EmailDeliveryFailed,
}

/// Token-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid length: {field} (expected: {expected}, actual: {actual})")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Passwords do not match")]
    PasswordMismatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_errors_are_uninformative() {
        // Wrong code and expired code must render identically
        let message = AuthError::InvalidVerificationCode.to_string();
        assert!(!message.to_lowercase().contains("user"));
        assert!(!message.to_lowercase().contains("exist"));
    }

    #[test]
    fn test_validation_error_with_fields() {
        let error = ValidationError::InvalidLength {
            field: "code".to_string(),
            expected: 4,
            actual: 6,
        };
        let message = error.to_string();
        assert!(message.contains("code"));
        assert!(message.contains('4'));
    }
}
