//! Google identity provider verification.
//!
//! Exchanges a frontend-obtained access token for Google's userinfo
//! claims. The backend performs no authorization-code handshake; the
//! provider is strictly a bearer-token verifier. Every failure mode —
//! non-2xx status, timeout, connection error, malformed body — comes
//! back as an opaque error string for the social auth service to
//! collapse into its single rejection variant.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use kg_core::services::social::{IdentityProviderTrait, ProviderIdentity};
use kg_shared::config::GoogleOAuthConfig;

use crate::InfrastructureError;

/// Google userinfo client implementing the identity provider trait
pub struct GoogleIdentityProvider {
    client: Client,
    userinfo_url: String,
}

impl GoogleIdentityProvider {
    /// Create a new Google identity provider client
    pub fn new(config: &GoogleOAuthConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                InfrastructureError::Config(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            userinfo_url: config.userinfo_url.clone(),
        })
    }
}

#[async_trait]
impl IdentityProviderTrait for GoogleIdentityProvider {
    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, String> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    event = "userinfo_request_failed",
                    "Userinfo request to Google failed"
                );
                format!("userinfo request failed: {}", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = %status,
                event = "userinfo_rejected",
                "Google rejected the access token"
            );
            return Err(format!("userinfo returned status {}", status));
        }

        let identity: ProviderIdentity = response
            .json()
            .await
            .map_err(|e| format!("malformed userinfo response: {}", e))?;

        if identity.email.is_empty() {
            return Err("userinfo response missing email".to_string());
        }

        Ok(identity)
    }
}
