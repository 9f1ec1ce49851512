use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;
use kg_shared::utils::validation::mask_email;

use crate::dto::auth::{ForgotPasswordRequest, MessageResponse};
use crate::handlers::{handle_domain_error, validation_error_response};

use super::AppState;

/// Handler for POST /auth/forgot-password
///
/// Issues a password reset token and emails it to the account. Any
/// previously issued unused reset token is invalidated.
///
/// Unknown emails answer 400: this deployment favors explicit feedback
/// over anti-enumeration for this endpoint.
///
/// # Responses
/// - 200 OK: `{message}`
/// - 400 Bad Request: unknown email or social-only account
/// - 503 Service Unavailable: email could not be sent
pub async fn forgot_password<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    request: web::Json<ForgotPasswordRequest>,
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

    log::info!(
        "Password reset requested for {}",
        mask_email(&request.email)
    );

    match state.auth_service.forgot_password(&request.email).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse {
            message: "Password reset instructions have been sent to your email.".to_string(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
