use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;

use crate::dto::auth::{MessageResponse, ResetPasswordRequest};
use crate::handlers::{handle_domain_error, validation_error_response};

use super::AppState;

/// Handler for POST /auth/reset-password
///
/// Redeems a reset token against the claimed email and stores the new
/// password. Unknown email, unknown token and expired token all answer
/// with the same 400.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "bob@example.com",
///     "token": "3q2-CPSU7yM0...",
///     "new_password": "a-brand-new-password"
/// }
/// ```
///
/// # Responses
/// - 200 OK: `{message}`
/// - 400 Bad Request: invalid/expired/mismatched token
pub async fn reset_password<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    request: web::Json<ResetPasswordRequest>,
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
        .reset_password(&request.email, &request.token, &request.new_password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(MessageResponse {
            message: "Password has been reset successfully.".to_string(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
