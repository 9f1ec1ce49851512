use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;

use crate::dto::auth::{LogoutRequest, MessageResponse};
use crate::handlers::{handle_domain_error, validation_error_response};
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /auth/logout
///
/// Revokes the presented refresh token so it can never again be
/// exchanged for an access token. Requires a Bearer access token.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "kJ8s...32-char-opaque-value"
/// }
/// ```
///
/// # Responses
/// - 200 OK: `{message}`
/// - 400 Bad Request: unknown or already-revoked refresh token
/// - 401 Unauthorized: missing or invalid access token
pub async fn logout<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    _auth: AuthContext,
    request: web::Json<LogoutRequest>,
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

    match state.auth_service.logout(&request.refresh_token).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse {
            message: "Successfully logged out".to_string(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
