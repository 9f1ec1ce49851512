//! Trait for the external identity provider collaborator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identity attributes returned by the provider's userinfo endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Email address asserted by the provider
    pub email: String,

    /// Whether the provider has verified the email address
    #[serde(default)]
    pub verified_email: bool,

    /// Given name from the provider profile
    #[serde(default)]
    pub given_name: Option<String>,

    /// Family name from the provider profile
    #[serde(default)]
    pub family_name: Option<String>,

    /// Profile picture URL from the provider
    #[serde(default)]
    pub picture: Option<String>,
}

/// Trait for identity provider integration
///
/// Implementations exchange a bearer access token for the provider's
/// identity claims. Every failure mode — non-200 response, timeout,
/// DNS, malformed body — is an opaque string; the social auth service
/// collapses all of them into `ProviderAuthFailed` and never surfaces a
/// raw transport error.
#[async_trait]
pub trait IdentityProviderTrait: Send + Sync {
    /// Fetch the identity behind an access token
    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, String>;
}
