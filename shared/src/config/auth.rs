//! Authentication and authorization configuration

use serde::{Deserialize, Serialize};

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from("your-secret-key-change-in-production"),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604800,  // 7 days
            issuer: String::from("keygate"),
            audience: String::from("keygate-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using the default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == "your-secret-key-change-in-production"
    }
}

/// Google OAuth provider configuration
///
/// The backend never performs the authorization-code dance; it only
/// verifies access tokens the frontend obtained, against the provider's
/// userinfo endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleOAuthConfig {
    /// Userinfo endpoint queried with the bearer token
    pub userinfo_url: String,

    /// Request timeout in seconds for the userinfo call
    pub request_timeout_secs: u64,
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            userinfo_url: String::from("https://www.googleapis.com/oauth2/v2/userinfo"),
            request_timeout_secs: 10,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Google OAuth provider configuration
    #[serde(default)]
    pub google: GoogleOAuthConfig,

    /// Base URL embedded in password reset emails, if configured
    #[serde(default)]
    pub password_reset_url: Option<String>,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "development-secret-please-change-in-production".to_string());
        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);
        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);

        Self {
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_expiry,
                refresh_token_expiry,
                issuer: String::from("keygate"),
                audience: String::from("keygate-api"),
            },
            google: GoogleOAuthConfig::default(),
            password_reset_url: std::env::var("PASSWORD_RESET_URL").ok(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            google: GoogleOAuthConfig::default(),
            password_reset_url: None,
        }
    }
}
