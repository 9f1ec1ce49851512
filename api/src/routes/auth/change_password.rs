use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;

use crate::dto::auth::{ChangePasswordRequest, MessageResponse};
use crate::handlers::{handle_domain_error, validation_error_response};
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /auth/change-password
///
/// Changes the authenticated user's password. Requires a Bearer access
/// token; social-only accounts are rejected before any password
/// comparison happens.
///
/// # Responses
/// - 200 OK: `{message}`
/// - 400 Bad Request: social-only account
/// - 401 Unauthorized: missing/invalid session or wrong old password
pub async fn change_password<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    auth: AuthContext,
    request: web::Json<ChangePasswordRequest>,
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
        .change_password(auth.user_id, &request.old_password, &request.new_password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(MessageResponse {
            message: "Password changed successfully".to_string(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
