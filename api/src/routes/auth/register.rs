use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;
use kg_shared::utils::validation::mask_email;

use crate::dto::auth::{RegisterRequest, RegisterResponse, TokenPairDto, UserDto};
use crate::handlers::{handle_domain_error, validation_error_response};

use super::AppState;

/// Handler for POST /auth/register
///
/// Registers a new account and dispatches its email verification code.
/// Account creation and email dispatch are one unit: if the code cannot
/// be delivered, the account is not created.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "alice@example.com",
///     "name": "Alice",
///     "password": "s3cret-password",
///     "photo_url": "https://example.com/alice.jpg"
/// }
/// ```
///
/// # Responses
/// - 201 Created: `{user, tokens, message}`
/// - 400 Bad Request: invalid data or email already in use
/// - 503 Service Unavailable: verification email could not be sent
pub async fn register<U, V, R, M, P, K>(
    state: web::Data<AppState<U, V, R, M, P, K>>,
    request: web::Json<RegisterRequest>,
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
        "Processing registration for {}",
        mask_email(&request.email)
    );

    let result = state
        .auth_service
        .register(
            &request.email,
            &request.name,
            request.password.as_deref(),
            request.photo_url.clone(),
        )
        .await;

    match result {
        Ok(auth) => HttpResponse::Created().json(RegisterResponse {
            tokens: TokenPairDto {
                access: auth.access_token,
                refresh: auth.refresh_token,
            },
            user: UserDto::from(auth.user),
            message: "A verification code has been sent to your email.".to_string(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
