//! Tests for the authentication service

use std::sync::Arc;

use chrono::Utc;

use crate::domain::clock::FixedClock;
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, TokenError, ValidationError};
use crate::repositories::user::r#trait::UserRepository;
use crate::repositories::{
    MockRefreshTokenRepository, MockUserRepository, MockVerificationTokenRepository,
};
use crate::services::auth::config::AuthServiceConfig;
use crate::services::auth::service::AuthService;
use crate::services::password::hash_password;
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::services::verification::tests::mocks::MockMailer;
use crate::services::verification::{VerificationService, VerificationServiceConfig};

type TestAuthService = AuthService<
    MockUserRepository,
    MockVerificationTokenRepository,
    MockRefreshTokenRepository,
    MockMailer,
    FixedClock,
>;

struct Fixture {
    users: Arc<MockUserRepository>,
    mailer: Arc<MockMailer>,
    service: TestAuthService,
}

fn fixture_with(mailer_fails: bool) -> Fixture {
    let users = Arc::new(MockUserRepository::new());
    let tokens = Arc::new(MockVerificationTokenRepository::new(users.store()));
    let mailer = Arc::new(MockMailer::new(mailer_fails));
    let clock = Arc::new(FixedClock::new(Utc::now()));

    let verification_service = Arc::new(VerificationService::new(
        tokens,
        Arc::clone(&users),
        Arc::clone(&mailer),
        clock,
        VerificationServiceConfig::default(),
    ));
    let token_service = Arc::new(TokenService::new(
        MockRefreshTokenRepository::new(),
        TokenServiceConfig::default(),
    ));

    let service = AuthService::new(
        Arc::clone(&users),
        verification_service,
        token_service,
        AuthServiceConfig::default(),
    );

    Fixture {
        users,
        mailer,
        service,
    }
}

fn fixture() -> Fixture {
    fixture_with(false)
}

#[tokio::test]
async fn test_register_creates_user_and_sends_code() {
    let f = fixture();

    let response = f
        .service
        .register("Alice@Example.com", "Alice", Some("s3cret-pw!"), None)
        .await
        .unwrap();

    // Email is normalized before storage
    assert_eq!(response.user.email, "alice@example.com");
    assert!(!response.user.email_verified);
    assert!(f.mailer.sent_code("alice@example.com").is_some());
    assert!(!response.access_token.is_empty());
    assert!(!response.refresh_token.is_empty());
}

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let f = fixture();

    let err = f
        .service
        .register("not-an-email", "Alice", Some("pw"), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::InvalidEmail)
    ));
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let f = fixture();
    f.service
        .register("alice@example.com", "Alice", Some("pw-one-1"), None)
        .await
        .unwrap();

    let err = f
        .service
        .register("alice@example.com", "Alice Again", Some("pw-two-2"), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::EmailAlreadyRegistered)
    ));
}

#[tokio::test]
async fn test_register_rolls_back_on_email_failure() {
    let f = fixture_with(true);

    let err = f
        .service
        .register("alice@example.com", "Alice", Some("s3cret-pw!"), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::EmailDeliveryFailed)
    ));

    // The half-registered account must not exist
    assert!(f
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_login_round_trip() {
    let f = fixture();
    f.service
        .register("alice@example.com", "Alice", Some("s3cret-pw!"), None)
        .await
        .unwrap();

    let response = f.service.login("alice@example.com", "s3cret-pw!").await.unwrap();

    assert_eq!(response.user.email, "alice@example.com");
    assert!(response.user.last_login_at.is_some());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let f = fixture();
    f.service
        .register("alice@example.com", "Alice", Some("s3cret-pw!"), None)
        .await
        .unwrap();

    let err = f
        .service
        .login("alice@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_unknown_user_is_invalid_credentials() {
    let f = fixture();

    // Same error as a wrong password: no account-existence signal
    let err = f
        .service
        .login("ghost@example.com", "whatever")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_social_only_account_cannot_password_login() {
    let f = fixture();
    f.users
        .create(User::new_social(
            "social@example.com".to_string(),
            "Social".to_string(),
            None,
        ))
        .await
        .unwrap();

    // Whatever the supplied password, the answer is SocialAuthOnly
    for password in ["", "guess", "hunter2"] {
        let err = f
            .service
            .login("social@example.com", password)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Auth(AuthError::SocialAuthOnly)));
    }
}

#[tokio::test]
async fn test_social_only_account_cannot_change_password() {
    let f = fixture();
    let user = f
        .users
        .create(User::new_social(
            "social@example.com".to_string(),
            "Social".to_string(),
            None,
        ))
        .await
        .unwrap();

    let err = f
        .service
        .change_password(user.id, "anything", "new-password")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::SocialAuthOnly)));
}

#[tokio::test]
async fn test_change_password_requires_correct_old_password() {
    let f = fixture();
    let user = f
        .users
        .create(User::new(
            "alice@example.com".to_string(),
            "Alice".to_string(),
            Some(hash_password("old-pw").unwrap()),
        ))
        .await
        .unwrap();

    let err = f
        .service
        .change_password(user.id, "not-the-old-pw", "new-pw")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::InvalidCredentials)));

    f.service
        .change_password(user.id, "old-pw", "new-pw")
        .await
        .unwrap();
    f.service.login("alice@example.com", "new-pw").await.unwrap();
}

#[tokio::test]
async fn test_verify_email_issues_fresh_session() {
    let f = fixture();
    f.service
        .register("alice@example.com", "Alice", Some("s3cret-pw!"), None)
        .await
        .unwrap();
    let code = f.mailer.sent_code("alice@example.com").unwrap();

    let response = f.service.verify_email("alice@example.com", &code).await.unwrap();

    assert!(response.user.email_verified);
    assert!(!response.access_token.is_empty());
}

#[tokio::test]
async fn test_resend_verification_invalidates_old_code() {
    let f = fixture();
    f.service
        .register("alice@example.com", "Alice", Some("s3cret-pw!"), None)
        .await
        .unwrap();
    let old_code = f.mailer.sent_code("alice@example.com").unwrap();

    f.service.resend_verification("alice@example.com").await.unwrap();
    let new_code = f.mailer.sent_code("alice@example.com").unwrap();

    // Guard against the rare 1-in-9000 regeneration collision
    if old_code != new_code {
        let err = f
            .service
            .verify_email("alice@example.com", &old_code)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Auth(AuthError::InvalidVerificationCode)
        ));
    }

    f.service
        .verify_email("alice@example.com", &new_code)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_forgot_then_reset_password_revokes_sessions() {
    let f = fixture();
    let registered = f
        .service
        .register("bob@example.com", "Bob", Some("original-pw"), None)
        .await
        .unwrap();

    f.service.forgot_password("bob@example.com").await.unwrap();
    let token = f.mailer.sent_reset_token("bob@example.com").unwrap();

    f.service
        .reset_password("bob@example.com", &token, "brand-new-pw")
        .await
        .unwrap();

    // Old password dead, new password live
    assert!(matches!(
        f.service.login("bob@example.com", "original-pw").await.unwrap_err(),
        DomainError::Auth(AuthError::InvalidCredentials)
    ));
    f.service.login("bob@example.com", "brand-new-pw").await.unwrap();

    // Pre-reset refresh tokens were revoked
    let err = f.service.refresh(&registered.refresh_token).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenRevoked)));
}

#[tokio::test]
async fn test_refresh_rotates_session() {
    let f = fixture();
    let registered = f
        .service
        .register("alice@example.com", "Alice", Some("s3cret-pw!"), None)
        .await
        .unwrap();

    let refreshed = f.service.refresh(&registered.refresh_token).await.unwrap();
    assert_ne!(refreshed.refresh_token, registered.refresh_token);

    // The old refresh token is spent
    let err = f.service.refresh(&registered.refresh_token).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenRevoked)));
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let f = fixture();
    let registered = f
        .service
        .register("alice@example.com", "Alice", Some("s3cret-pw!"), None)
        .await
        .unwrap();

    f.service.logout(&registered.refresh_token).await.unwrap();

    let err = f.service.logout(&registered.refresh_token).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Token(TokenError::InvalidRefreshToken)
    ));
}

#[tokio::test]
async fn test_logout_with_garbage_token_is_rejected_input() {
    let f = fixture();

    let err = f.service.logout("never-issued").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Token(TokenError::InvalidRefreshToken)
    ));
}
