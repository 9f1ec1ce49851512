//! SMTP mailer implementation using lettre.
//!
//! Sends the plain-text transactional emails of the verification flows.
//! The transport is synchronous, so sends run on the blocking thread
//! pool to keep the async runtime free.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

use kg_core::services::verification::MailerTrait;
use kg_shared::config::EmailConfig;
use kg_shared::utils::validation::mask_email;

use crate::InfrastructureError;

/// SMTP mailer backed by lettre
pub struct SmtpMailer {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration
    pub fn new(config: &EmailConfig) -> Result<Self, InfrastructureError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let mailer = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| InfrastructureError::Email(format!("Invalid SMTP relay: {}", e)))?
            .credentials(credentials)
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| InfrastructureError::Email(format!("Invalid from address: {}", e)))?;

        tracing::info!(
            host = %config.smtp_host,
            "SMTP mailer initialized"
        );

        Ok(Self { mailer, from })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(&EmailConfig::from_env())
    }

    async fn send_email(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        body: String,
    ) -> Result<String, String> {
        let to: Mailbox = format!("{} <{}>", to_name, to_email)
            .parse()
            .map_err(|e| format!("Invalid recipient address: {}", e))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| format!("Failed to build message: {}", e))?;

        // lettre's SMTP transport is blocking
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| format!("Send task panicked: {}", e))?;

        match result {
            Ok(response) => {
                tracing::info!(
                    to = %mask_email(to_email),
                    event = "email_sent",
                    "Email dispatched"
                );
                Ok(response.code().to_string())
            }
            Err(e) => {
                tracing::error!(
                    to = %mask_email(to_email),
                    error = %e,
                    event = "email_send_failed",
                    "Failed to dispatch email"
                );
                Err(e.to_string())
            }
        }
    }
}

#[async_trait]
impl MailerTrait for SmtpMailer {
    async fn send_verification_email(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<String, String> {
        let body = format!(
            "Hello {to_name},\n\n\
             Thank you for registering! Please use the verification code below to verify your email address:\n\n\
             Verification Code: {code}\n\n\
             This code will expire in 15 minutes.\n\n\
             If you didn't create an account, please ignore this email.\n\n\
             Best regards,\n\
             The Keygate Team"
        );

        self.send_email(to_email, to_name, "Verify Your Email Address", body)
            .await
    }

    async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
        reset_url: Option<&str>,
    ) -> Result<String, String> {
        let body = match reset_url {
            Some(url) => format!(
                "Hello {to_name},\n\n\
                 We received a request to reset your password. Click the link below to reset your password:\n\n\
                 {url}?token={token}\n\n\
                 If you prefer, you can use this token: {token}\n\n\
                 This link will expire in 1 hour.\n\n\
                 If you didn't request a password reset, please ignore this email.\n\n\
                 Best regards,\n\
                 The Keygate Team"
            ),
            None => format!(
                "Hello {to_name},\n\n\
                 We received a request to reset your password. Please use the token below to reset your password:\n\n\
                 Reset Token: {token}\n\n\
                 This token will expire in 1 hour.\n\n\
                 If you didn't request a password reset, please ignore this email.\n\n\
                 Best regards,\n\
                 The Keygate Team"
            ),
        };

        self.send_email(to_email, to_name, "Password Reset Request", body)
            .await
    }
}
