//! Configuration for the verification service

/// Configuration for the verification service
#[derive(Debug, Clone, Default)]
pub struct VerificationServiceConfig {
    /// Base URL embedded in password reset emails. When set, the mail
    /// carries `{reset_url}?token={token}` alongside the raw token.
    pub reset_url: Option<String>,
}

impl VerificationServiceConfig {
    /// Configure the password reset URL
    pub fn with_reset_url(mut self, url: impl Into<String>) -> Self {
        self.reset_url = Some(url.into());
        self
    }
}
