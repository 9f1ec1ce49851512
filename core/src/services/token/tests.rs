//! Tests for the token service

use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::{DomainError, TokenError};
use crate::repositories::MockRefreshTokenRepository;

use super::config::TokenServiceConfig;
use super::service::TokenService;

fn service() -> TokenService<MockRefreshTokenRepository> {
    TokenService::new(MockRefreshTokenRepository::new(), TokenServiceConfig::default())
}

fn test_user() -> User {
    User::new(
        "alice@example.com".to_string(),
        "Alice".to_string(),
        Some("$2b$12$hash".to_string()),
    )
}

#[tokio::test]
async fn test_generate_and_verify_access_token() {
    let service = service();
    let user = test_user();

    let pair = service.generate_tokens(&user).await.unwrap();

    let claims = service.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.email, "alice@example.com");
    assert!(!claims.email_verified);
}

#[tokio::test]
async fn test_verify_access_token_rejects_garbage() {
    let service = service();

    let err = service.verify_access_token("not.a.jwt").unwrap_err();
    assert!(matches!(err, DomainError::Token(_)));
}

#[tokio::test]
async fn test_verify_access_token_rejects_wrong_secret() {
    let user = test_user();
    let issuing = service();
    let pair = issuing.generate_tokens(&user).await.unwrap();

    let other = TokenService::new(
        MockRefreshTokenRepository::new(),
        TokenServiceConfig {
            jwt_secret: "a-different-secret".to_string(),
            ..TokenServiceConfig::default()
        },
    );

    let err = other.verify_access_token(&pair.access_token).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Token(TokenError::InvalidSignature)
    ));
}

#[tokio::test]
async fn test_verify_refresh_token_returns_user_id() {
    let service = service();
    let user = test_user();

    let pair = service.generate_tokens(&user).await.unwrap();
    let user_id = service
        .verify_refresh_token(&pair.refresh_token)
        .await
        .unwrap();

    assert_eq!(user_id, user.id);
}

#[tokio::test]
async fn test_unknown_refresh_token_is_invalid() {
    let service = service();

    let err = service
        .verify_refresh_token("completely-unknown-token")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Token(TokenError::InvalidRefreshToken)
    ));
}

#[tokio::test]
async fn test_revoke_refresh_token_then_reuse_fails() {
    let service = service();
    let user = test_user();
    let pair = service.generate_tokens(&user).await.unwrap();

    service
        .revoke_refresh_token(&pair.refresh_token)
        .await
        .unwrap();

    let err = service
        .verify_refresh_token(&pair.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenRevoked)));
}

#[tokio::test]
async fn test_revoking_twice_reports_invalid_token() {
    let service = service();
    let user = test_user();
    let pair = service.generate_tokens(&user).await.unwrap();

    service
        .revoke_refresh_token(&pair.refresh_token)
        .await
        .unwrap();

    let err = service
        .revoke_refresh_token(&pair.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Token(TokenError::InvalidRefreshToken)
    ));
}

#[tokio::test]
async fn test_refresh_rotates_and_revokes_old_token() {
    let service = service();
    let user = test_user();
    let pair = service.generate_tokens(&user).await.unwrap();

    let new_pair = service
        .refresh_tokens(&pair.refresh_token, &user)
        .await
        .unwrap();

    assert_ne!(new_pair.refresh_token, pair.refresh_token);

    // The rotated-out token is dead
    let err = service
        .verify_refresh_token(&pair.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenRevoked)));

    // The new one works
    assert_eq!(
        service
            .verify_refresh_token(&new_pair.refresh_token)
            .await
            .unwrap(),
        user.id
    );
}

#[tokio::test]
async fn test_refresh_rejects_token_of_another_user() {
    let service = service();
    let user = test_user();
    let pair = service.generate_tokens(&user).await.unwrap();

    let mut other = test_user();
    other.id = Uuid::new_v4();
    other.email = "mallory@example.com".to_string();

    let err = service
        .refresh_tokens(&pair.refresh_token, &other)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Token(TokenError::InvalidRefreshToken)
    ));
}
