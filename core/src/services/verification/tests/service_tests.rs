//! Behavioral tests for the verification flows

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::clock::{Clock, FixedClock};
use crate::domain::entities::user::User;
use crate::domain::entities::verification_token::TokenPurpose;
use crate::errors::{AuthError, DomainError};
use crate::repositories::user::r#trait::UserRepository;
use crate::repositories::{
    MockUserRepository, MockVerificationTokenRepository, VerificationTokenRepository,
};
use crate::services::password::{hash_password, verify_password};
use crate::services::verification::config::VerificationServiceConfig;
use crate::services::verification::service::VerificationService;

use super::mocks::MockMailer;

struct Fixture {
    users: Arc<MockUserRepository>,
    tokens: Arc<MockVerificationTokenRepository>,
    mailer: Arc<MockMailer>,
    clock: Arc<FixedClock>,
    service: VerificationService<
        MockVerificationTokenRepository,
        MockUserRepository,
        MockMailer,
        FixedClock,
    >,
}

fn fixture_with(mailer_fails: bool, config: VerificationServiceConfig) -> Fixture {
    let users = Arc::new(MockUserRepository::new());
    let tokens = Arc::new(MockVerificationTokenRepository::new(users.store()));
    let mailer = Arc::new(MockMailer::new(mailer_fails));
    let clock = Arc::new(FixedClock::new(Utc::now()));

    let service = VerificationService::new(
        Arc::clone(&tokens),
        Arc::clone(&users),
        Arc::clone(&mailer),
        Arc::clone(&clock),
        config,
    );

    Fixture {
        users,
        tokens,
        mailer,
        clock,
        service,
    }
}

fn fixture() -> Fixture {
    fixture_with(false, VerificationServiceConfig::default())
}

async fn password_user(fixture: &Fixture, email: &str) -> User {
    fixture
        .users
        .create(User::new(
            email.to_string(),
            "Test User".to_string(),
            Some(hash_password("original-pw").unwrap()),
        ))
        .await
        .unwrap()
}

async fn social_user(fixture: &Fixture, email: &str) -> User {
    fixture
        .users
        .create(User::new_social(email.to_string(), "Social User".to_string(), None))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_request_email_verification_sends_code() {
    let f = fixture();
    let user = password_user(&f, "alice@example.com").await;

    let token = f.service.request_email_verification(&user).await.unwrap();

    assert_eq!(token.purpose, TokenPurpose::EmailVerification);
    assert_eq!(f.mailer.sent_code("alice@example.com").unwrap(), token.token);
    assert_eq!(
        token.expires_at - token.created_at,
        Duration::minutes(15)
    );
}

#[tokio::test]
async fn test_request_email_verification_rejects_verified_user() {
    let f = fixture();
    let mut user = password_user(&f, "alice@example.com").await;
    user.verify_email();
    f.users.update(user.clone()).await.unwrap();

    let err = f.service.request_email_verification(&user).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::EmailAlreadyVerified)
    ));
}

#[tokio::test]
async fn test_reissue_invalidates_previous_code() {
    let f = fixture();
    let user = password_user(&f, "alice@example.com").await;

    let first = f.service.request_email_verification(&user).await.unwrap();
    let second = f.service.request_email_verification(&user).await.unwrap();

    // Exactly one live token after reissue
    assert_eq!(
        f.tokens
            .count_active(user.id, TokenPurpose::EmailVerification, f.clock.now())
            .await
            .unwrap(),
        1
    );

    // Redeeming the superseded code fails without revealing why
    let err = f
        .service
        .confirm_email("alice@example.com", &first.token)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::InvalidVerificationCode)
    ));

    // The fresh code succeeds
    let verified = f
        .service
        .confirm_email("alice@example.com", &second.token)
        .await
        .unwrap();
    assert!(verified.email_verified);
}

#[tokio::test]
async fn test_confirm_email_is_single_use() {
    let f = fixture();
    let user = password_user(&f, "alice@example.com").await;
    let token = f.service.request_email_verification(&user).await.unwrap();

    f.service
        .confirm_email("alice@example.com", &token.token)
        .await
        .unwrap();

    // Idempotent re-redeem is rejected as already verified
    let err = f
        .service
        .confirm_email("alice@example.com", &token.token)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::EmailAlreadyVerified)
    ));
}

#[tokio::test]
async fn test_confirm_email_expired_code_is_indistinguishable_from_wrong_code() {
    let f = fixture();
    let user = password_user(&f, "alice@example.com").await;
    let token = f.service.request_email_verification(&user).await.unwrap();

    f.clock.advance(Duration::minutes(16));

    let expired_err = f
        .service
        .confirm_email("alice@example.com", &token.token)
        .await
        .unwrap_err();
    let wrong_err = f
        .service
        .confirm_email("alice@example.com", "0000")
        .await
        .unwrap_err();

    assert_eq!(
        expired_err.to_string(),
        wrong_err.to_string(),
        "expired and wrong codes must be indistinguishable"
    );
}

#[tokio::test]
async fn test_confirm_email_unknown_account_looks_like_wrong_code() {
    let f = fixture();

    let err = f
        .service
        .confirm_email("ghost@example.com", "1234")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::InvalidVerificationCode)
    ));
}

#[tokio::test]
async fn test_confirm_email_normalizes_address() {
    let f = fixture();
    let user = password_user(&f, "alice@example.com").await;
    let token = f.service.request_email_verification(&user).await.unwrap();

    let verified = f
        .service
        .confirm_email("  Alice@Example.COM ", &token.token)
        .await
        .unwrap();
    assert!(verified.email_verified);
}

#[tokio::test]
async fn test_email_delivery_failure_surfaces_distinct_error() {
    let f = fixture_with(true, VerificationServiceConfig::default());
    let user = password_user(&f, "alice@example.com").await;

    let err = f.service.request_email_verification(&user).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::EmailDeliveryFailed)
    ));
}

#[tokio::test]
async fn test_request_password_reset_flow() {
    let f = fixture();
    let user = password_user(&f, "bob@example.com").await;

    let token = f.service.request_password_reset("bob@example.com").await.unwrap();

    assert_eq!(token.purpose, TokenPurpose::PasswordReset);
    assert_eq!(token.user_id, user.id);
    assert_eq!(
        token.expires_at - token.created_at,
        Duration::minutes(60)
    );
    assert_eq!(
        f.mailer.sent_reset_token("bob@example.com").unwrap(),
        token.token
    );
}

#[tokio::test]
async fn test_request_password_reset_includes_configured_url() {
    let f = fixture_with(
        false,
        VerificationServiceConfig::default().with_reset_url("https://app.example.com/reset"),
    );
    password_user(&f, "bob@example.com").await;

    f.service.request_password_reset("bob@example.com").await.unwrap();

    let sent = f
        .mailer
        .reset_emails
        .lock()
        .unwrap()
        .get("bob@example.com")
        .cloned()
        .unwrap();
    assert_eq!(
        sent.reset_url.as_deref(),
        Some("https://app.example.com/reset")
    );
}

#[tokio::test]
async fn test_request_password_reset_unknown_user() {
    let f = fixture();

    let err = f
        .service
        .request_password_reset("ghost@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::UserNotFound)));
}

#[tokio::test]
async fn test_request_password_reset_social_account() {
    let f = fixture();
    social_user(&f, "social@example.com").await;

    let err = f
        .service
        .request_password_reset("social@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::SocialAuthOnly)));
}

#[tokio::test]
async fn test_reset_password_scenario() {
    let f = fixture();
    let user = password_user(&f, "bob@example.com").await;

    let token = f.service.request_password_reset("bob@example.com").await.unwrap();

    // Wrong token leaves the password unchanged
    let err = f
        .service
        .reset_password("bob@example.com", "wrong-token", "new-password-1")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::InvalidResetToken)));
    let unchanged = f.users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(verify_password("original-pw", unchanged.password_hash.as_deref().unwrap()).unwrap());

    // The real token changes it
    f.service
        .reset_password("bob@example.com", &token.token, "new-password-1")
        .await
        .unwrap();
    let changed = f.users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(verify_password("new-password-1", changed.password_hash.as_deref().unwrap()).unwrap());

    // Reuse of the consumed token fails
    let err = f
        .service
        .reset_password("bob@example.com", &token.token, "new-password-2")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::InvalidResetToken)));
}

#[tokio::test]
async fn test_reset_password_expired_token() {
    let f = fixture();
    password_user(&f, "bob@example.com").await;

    let token = f.service.request_password_reset("bob@example.com").await.unwrap();

    f.clock.advance(Duration::minutes(61));

    let err = f
        .service
        .reset_password("bob@example.com", &token.token, "new-password")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::InvalidResetToken)));
}

#[tokio::test]
async fn test_reset_token_bound_to_requesting_user() {
    let f = fixture();
    password_user(&f, "bob@example.com").await;
    password_user(&f, "carol@example.com").await;

    let token = f.service.request_password_reset("bob@example.com").await.unwrap();

    // Bob's token cannot be redeemed against Carol's identity claim
    let err = f
        .service
        .reset_password("carol@example.com", &token.token, "new-password")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::InvalidResetToken)));
}
