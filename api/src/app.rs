//! Application factory
//!
//! Builds the Actix application generic over the repository and
//! collaborator traits, so tests can run the full HTTP surface against
//! in-memory implementations.

use actix_web::{body::MessageBody, middleware::Logger, web, App, HttpResponse};

use kg_core::domain::clock::Clock;
use kg_core::repositories::{
    RefreshTokenRepository, UserRepository, VerificationTokenRepository,
};
use kg_core::services::social::IdentityProviderTrait;
use kg_core::services::verification::MailerTrait;

use crate::middleware::{auth::JwtAuth, cors::create_cors};
use crate::routes::auth::{
    change_password::change_password, forgot_password::forgot_password, google::google_login,
    login::login, logout::logout, refresh::refresh, register::register,
    reset_password::reset_password,
    verify_email::{resend_verification, verify_email},
    AppState,
};

/// Create and configure the application with all dependencies
pub fn create_app<U, V, R, M, P, K>(
    app_state: web::Data<AppState<U, V, R, M, P, K>>,
    jwt_secret: String,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    V: VerificationTokenRepository + 'static,
    R: RefreshTokenRepository + 'static,
    M: MailerTrait + 'static,
    P: IdentityProviderTrait + 'static,
    K: Clock + 'static,
{
    let cors = create_cors();

    App::new()
        .app_data(app_state)
        .wrap(Logger::default())
        .wrap(cors)
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // Auth routes
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(register::<U, V, R, M, P, K>))
                .route("/login", web::post().to(login::<U, V, R, M, P, K>))
                .route(
                    "/verify-email",
                    web::post().to(verify_email::<U, V, R, M, P, K>),
                )
                .route(
                    "/resend-verification",
                    web::post().to(resend_verification::<U, V, R, M, P, K>),
                )
                .route(
                    "/forgot-password",
                    web::post().to(forgot_password::<U, V, R, M, P, K>),
                )
                .route(
                    "/reset-password",
                    web::post().to(reset_password::<U, V, R, M, P, K>),
                )
                .route("/google", web::post().to(google_login::<U, V, R, M, P, K>))
                .route("/refresh", web::post().to(refresh::<U, V, R, M, P, K>))
                .service(
                    web::resource("/logout")
                        .wrap(JwtAuth::with_secret(jwt_secret.clone()))
                        .route(web::post().to(logout::<U, V, R, M, P, K>)),
                )
                .service(
                    web::resource("/change-password")
                        .wrap(JwtAuth::with_secret(jwt_secret))
                        .route(web::post().to(change_password::<U, V, R, M, P, K>)),
                ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "keygate-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "The requested resource was not found"
    }))
}
