//! Trait for the outbound email delivery collaborator

use async_trait::async_trait;

/// Trait for email delivery integration
///
/// Implementations return a provider message id on success. Failure is
/// an opaque string; the verification service maps any failure to the
/// `EmailDeliveryFailed` domain error, and callers that created state in
/// the same logical operation are responsible for compensating.
#[async_trait]
pub trait MailerTrait: Send + Sync {
    /// Send the email verification code
    async fn send_verification_email(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<String, String>;

    /// Send the password reset token, with an optional constructed
    /// reset link when the deployment has a frontend URL configured
    async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
        reset_url: Option<&str>,
    ) -> Result<String, String>;
}
