use std::sync::Arc;

use actix_web::{web, HttpServer};
use dotenv::dotenv;
use log::info;

use kg_core::domain::clock::SystemClock;
use kg_core::services::auth::{AuthService, AuthServiceConfig};
use kg_core::services::social::SocialAuthService;
use kg_core::services::token::{TokenService, TokenServiceConfig};
use kg_core::services::verification::{VerificationService, VerificationServiceConfig};
use kg_infra::database::mysql::{
    MySqlRefreshTokenRepository, MySqlUserRepository, MySqlVerificationTokenRepository,
};
use kg_infra::database::create_pool;
use kg_infra::email::SmtpMailer;
use kg_infra::oauth::GoogleIdentityProvider;
use kg_shared::config::AppConfig;

use kg_api::app::create_app;
use kg_api::routes::auth::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Keygate API server");

    let config = AppConfig::from_env();
    if config.auth.jwt.secret.contains("change-in-production") {
        log::warn!("JWT_SECRET is not set; using an insecure development secret");
    }

    // Database pool and repositories
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let user_repository = Arc::new(MySqlUserRepository::new(pool.clone()));
    let verification_repository = Arc::new(MySqlVerificationTokenRepository::new(pool.clone()));
    let refresh_repository = MySqlRefreshTokenRepository::new(pool);

    // External collaborators
    let mailer = Arc::new(
        SmtpMailer::new(&config.email)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );
    let provider = Arc::new(
        GoogleIdentityProvider::new(&config.auth.google)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );
    let clock = Arc::new(SystemClock);

    // Core services
    let token_service = Arc::new(TokenService::new(
        refresh_repository,
        TokenServiceConfig::from(&config.auth.jwt),
    ));

    let mut verification_config = VerificationServiceConfig::default();
    verification_config.reset_url = config.auth.password_reset_url.clone();
    let verification_service = Arc::new(VerificationService::new(
        verification_repository,
        Arc::clone(&user_repository),
        Arc::clone(&mailer),
        clock,
        verification_config,
    ));

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        verification_service,
        Arc::clone(&token_service),
        AuthServiceConfig::default(),
    ));
    let social_service = Arc::new(SocialAuthService::new(
        user_repository,
        token_service,
        provider,
    ));

    let app_state = web::Data::new(AppState::new(auth_service, social_service));

    let bind_address = config.server.bind_address();
    let jwt_secret = config.auth.jwt.secret.clone();
    info!("Server will bind to: {}", bind_address);

    HttpServer::new(move || create_app(app_state.clone(), jwt_secret.clone()))
        .bind(&bind_address)?
        .run()
        .await
}
