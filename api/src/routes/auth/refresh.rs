use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;

use crate::dto::auth::{RefreshResponse, RefreshTokenRequest};
use crate::handlers::{handle_domain_error, validation_error_response};

use super::AppState;

/// Handler for POST /auth/refresh
///
/// Exchanges a refresh token for a new session pair. The presented
/// refresh token is rotated out and can never be exchanged again.
///
/// # Responses
/// - 200 OK: `{access_token, refresh_token, expires_in}`
/// - 400 Bad Request: unknown refresh token
/// - 401 Unauthorized: expired or revoked refresh token
pub async fn refresh<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    request: web::Json<RefreshTokenRequest>,
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

    match state.auth_service.refresh(&request.refresh_token).await {
        Ok(auth) => HttpResponse::Ok().json(RefreshResponse {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            expires_in: auth.expires_in,
        }),
        Err(error) => handle_domain_error(error),
    }
}
