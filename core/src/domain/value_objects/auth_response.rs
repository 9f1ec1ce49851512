//! Authentication response value object.

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::User;

/// Result of a successful authentication (login, registration,
/// verification or social login): session credentials plus the
/// authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// JWT access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token expiry in seconds
    pub expires_in: i64,

    /// The authenticated user
    pub user: User,
}

impl AuthResponse {
    /// Builds an authentication response from a token pair and the user
    /// it was issued to.
    pub fn from_token_pair(token_pair: TokenPair, user: User) -> Self {
        Self {
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            expires_in: token_pair.access_expires_in,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token_pair() {
        let user = User::new("a@b.co".to_string(), "A".to_string(), None);
        let pair = TokenPair::new("access".to_string(), "refresh".to_string());
        let expires = pair.access_expires_in;

        let response = AuthResponse::from_token_pair(pair, user.clone());

        assert_eq!(response.access_token, "access");
        assert_eq!(response.refresh_token, "refresh");
        assert_eq!(response.expires_in, expires);
        assert_eq!(response.user.id, user.id);
    }
}
