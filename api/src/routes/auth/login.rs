use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;

use crate::dto::auth::{LoginRequest, LoginResponse, UserDto};
use crate::handlers::{handle_domain_error, validation_error_response};

use super::AppState;

/// Handler for POST /auth/login
///
/// Authenticates with email and password.
///
/// # Responses
/// - 200 OK: `{access_token, refresh_token, expires_in, user}`
/// - 400 Bad Request: social-only account attempted a password login
/// - 401 Unauthorized: unknown email or wrong password (identical)
pub async fn login<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    request: web::Json<LoginRequest>,
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

    match state.auth_service.login(&request.email, &request.password).await {
        Ok(auth) => HttpResponse::Ok().json(LoginResponse {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            expires_in: auth.expires_in,
            user: UserDto::from(auth.user),
        }),
        Err(error) => handle_domain_error(error),
    }
}
