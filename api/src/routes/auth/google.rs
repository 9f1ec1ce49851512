use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;

use crate::dto::auth::{GoogleAuthRequest, GoogleAuthResponse, UserDto};
use crate::handlers::{handle_domain_error, validation_error_response};

use super::AppState;

/// Handler for POST /auth/google
///
/// Authenticates with a Google access token obtained by the frontend.
/// The token is verified against Google's userinfo endpoint; a verified
/// email is mapped to a local account, creating one on first login.
///
/// # Request Body
///
/// ```json
/// {
///     "access_token": "ya29.a0AfH6..."
/// }
/// ```
///
/// # Responses
/// - 200 OK: `{user, access_token, refresh_token}`
/// - 400 Bad Request: malformed request body
/// - 401 Unauthorized: provider rejected the token or email unverified
/// - 500 Internal Server Error: unexpected failure
pub async fn google_login<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    request: web::Json<GoogleAuthRequest>,
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

    match state.social_service.authenticate(&request.access_token).await {
        Ok(auth) => HttpResponse::Ok().json(GoogleAuthResponse {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            user: UserDto::from(auth.user),
        }),
        Err(error) => handle_domain_error(error),
    }
}
