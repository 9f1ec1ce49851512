//! Domain error to HTTP response mapping.
//!
//! This is the only place where the error taxonomy turns into transport
//! status codes; routes pass every `DomainError` through here.

use actix_web::HttpResponse;

use kg_core::errors::{AuthError, DomainError, TokenError};

use crate::dto::ErrorResponse;

/// Convert a domain error into its HTTP response.
///
/// Verification failures stay deliberately generic: the mapping may not
/// reintroduce detail the domain layer collapsed away.
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    log::warn!("Domain error: {:?}", error);

    match error {
        DomainError::Auth(auth_error) => match auth_error {
            AuthError::InvalidCredentials => HttpResponse::Unauthorized().json(
                ErrorResponse::new("invalid_credentials", "Invalid credentials"),
            ),
            AuthError::SocialAuthOnly => HttpResponse::BadRequest().json(ErrorResponse::new(
                "social_auth_account",
                "This account uses social authentication. Please login via your social provider.",
            )),
            AuthError::InvalidVerificationCode => HttpResponse::BadRequest().json(
                ErrorResponse::new(
                    "invalid_verification_code",
                    "Invalid or expired verification code.",
                ),
            ),
            AuthError::InvalidResetToken => HttpResponse::BadRequest().json(ErrorResponse::new(
                "invalid_reset_token",
                "Invalid or expired reset token.",
            )),
            AuthError::EmailAlreadyVerified => HttpResponse::BadRequest().json(
                ErrorResponse::new("email_already_verified", "Email is already verified."),
            ),
            AuthError::UserNotFound => HttpResponse::BadRequest().json(ErrorResponse::new(
                "user_not_found",
                "User with this email does not exist.",
            )),
            AuthError::EmailAlreadyRegistered => HttpResponse::BadRequest().json(
                ErrorResponse::new("email_in_use", "This email is already in use."),
            ),
            AuthError::ProviderAuthFailed => HttpResponse::Unauthorized().json(
                ErrorResponse::new(
                    "invalid_google_token",
                    "Invalid Google access token or authentication failed",
                ),
            ),
            AuthError::EmailDeliveryFailed => HttpResponse::ServiceUnavailable().json(
                ErrorResponse::new(
                    "email_service_error",
                    "Email could not be sent. Please try again later.",
                ),
            ),
        },
        DomainError::Token(token_error) => match token_error {
            TokenError::InvalidRefreshToken => HttpResponse::BadRequest().json(
                ErrorResponse::new("invalid_token", "Invalid or expired refresh token."),
            ),
            TokenError::TokenExpired => HttpResponse::Unauthorized().json(ErrorResponse::new(
                "token_expired",
                "Token has expired. Please login again.",
            )),
            TokenError::TokenRevoked => HttpResponse::Unauthorized().json(ErrorResponse::new(
                "token_revoked",
                "Token has been revoked. Please login again.",
            )),
            TokenError::TokenNotYetValid
            | TokenError::InvalidTokenFormat
            | TokenError::InvalidSignature => HttpResponse::Unauthorized().json(
                ErrorResponse::new("invalid_token", "Invalid authentication token."),
            ),
            TokenError::TokenGenerationFailed => {
                log::error!("Token generation failure");
                HttpResponse::InternalServerError().json(ErrorResponse::new(
                    "internal_error",
                    "An unexpected error occurred.",
                ))
            }
        },
        DomainError::Validation { message } => {
            HttpResponse::BadRequest().json(ErrorResponse::new("validation_error", message))
        }
        DomainError::ValidationErr(validation_error) => HttpResponse::BadRequest().json(
            ErrorResponse::new("validation_error", validation_error.to_string()),
        ),
        DomainError::NotFound { resource } => HttpResponse::NotFound().json(ErrorResponse::new(
            "not_found",
            format!("{} not found", resource),
        )),
        DomainError::Conflict { .. } => HttpResponse::Conflict().json(ErrorResponse::new(
            "conflict",
            "The resource already exists.",
        )),
        DomainError::Unauthorized => HttpResponse::Unauthorized().json(ErrorResponse::new(
            "unauthorized",
            "Authentication required.",
        )),
        DomainError::Internal { message } => {
            // Log the detail, never expose it
            log::error!("Internal error: {}", message);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "internal_error",
                "An unexpected error occurred.",
            ))
        }
    }
}

/// Convert request-shape validation failures into a 400 response
pub fn validation_error_response(errors: validator::ValidationErrors) -> HttpResponse {
    let mut details = std::collections::HashMap::new();
    details.insert(
        "validation_errors".to_string(),
        serde_json::json!(errors.field_errors().keys().collect::<Vec<_>>()),
    );

    HttpResponse::BadRequest().json(
        ErrorResponse::new("validation_error", "Invalid request data").with_details(details),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_verification_failures_map_to_400() {
        let response = handle_domain_error(DomainError::Auth(AuthError::InvalidVerificationCode));
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let response = handle_domain_error(DomainError::Auth(AuthError::InvalidResetToken));
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_credential_failures_map_to_401() {
        let response = handle_domain_error(DomainError::Auth(AuthError::InvalidCredentials));
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);

        let response = handle_domain_error(DomainError::Auth(AuthError::ProviderAuthFailed));
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_email_delivery_failure_maps_to_503() {
        let response = handle_domain_error(DomainError::Auth(AuthError::EmailDeliveryFailed));
        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[actix_rt::test]
    async fn test_internal_detail_is_not_leaked() {
        let response = handle_domain_error(DomainError::Internal {
            message: "password column corrupt".to_string(),
        });
        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("password column"));
    }
}
