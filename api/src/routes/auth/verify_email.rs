use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;

use crate::dto::auth::{
    MessageResponse, ResendVerificationRequest, VerifyEmailRequest, VerifyEmailResponse,
};
use crate::handlers::{handle_domain_error, validation_error_response};

use super::AppState;

/// Handler for POST /auth/verify-email
///
/// Redeems a 4-digit verification code against the claimed email. An
/// unknown email, a wrong code and an expired code all answer with the
/// same 400; a successful redemption returns a fresh session.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "alice@example.com",
///     "code": "4821"
/// }
/// ```
///
/// # Responses
/// - 200 OK: `{message, access_token, refresh_token}`
/// - 400 Bad Request: invalid/expired/mismatched code or already verified
pub async fn verify_email<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    request: web::Json<VerifyEmailRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    V: VerificationTokenRepository + 'static,
    R: RefreshTokenRepository + 'static,
    M: MailerTrait + 'static,
    P: IdentityProviderTrait + 'static,
    K: Clock + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    match state
        .auth_service
        .verify_email(&request.email, &request.code)
        .await
    {
        Ok(auth) => HttpResponse::Ok().json(VerifyEmailResponse {
            message: "Email verified successfully.".to_string(),
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
        }),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /auth/resend-verification
///
/// Re-issues the verification code, invalidating any previously issued
/// unused code for the account.
///
/// # Responses
/// - 200 OK: `{message}`
/// - 400 Bad Request: unknown email or already verified
/// - 503 Service Unavailable: email could not be sent
pub async fn resend_verification<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    request: web::Json<ResendVerificationRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    V: VerificationTokenRepository + 'static,
    R: RefreshTokenRepository + 'static,
    M: MailerTrait + 'static,
    P: IdentityProviderTrait + 'static,
    K: Clock + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    match state.auth_service.resend_verification(&request.email).await {
        Ok(_) => HttpResponse::Ok().json(MessageResponse {
            message: "A new verification code has been sent to your email.".to_string(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
