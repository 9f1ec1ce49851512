//! Configuration for the token service

use kg_shared::config::JwtConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Secret used for HS256 signing
    pub jwt_secret: String,
    /// Issuer claim stamped into and required from every token
    pub issuer: String,
    /// Audience claim stamped into and required from every token
    pub audience: String,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::from("test-secret-not-for-production"),
            issuer: String::from("keygate"),
            audience: String::from("keygate-api"),
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            jwt_secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }
}
