//! Email service for sending transactional emails.
//!
//! Uses `lettre` for SMTP transport.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Rendered subject and body of an outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
}

/// Email service for sending transactional emails.
#[derive(Debug, Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        Ok(transport)
    }

    /// Link the reset email points at. The token travels in the PKCE-style
    /// `token_hash` + `type=recovery` form.
    #[must_use]
    pub fn password_reset_url(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token_hash={token}&type=recovery",
            self.config.frontend_url.trim_end_matches('/')
        )
    }

    /// Renders the password reset mail.
    #[must_use]
    pub fn password_reset_content(
        &self,
        to_name: &str,
        token: &str,
        ttl_minutes: i64,
    ) -> EmailContent {
        let reset_url = self.password_reset_url(token);
        let body = format!(
            r"Hi {to_name},

We received a request to reset the password for your Runway account.
Choose a new password by opening the link below:

{reset_url}

This link will expire in {ttl_minutes} minutes and can be used once.

If you did not ask for a reset, you can ignore this email.

The Runway Team"
        );

        EmailContent {
            subject: "Reset your password - Runway".to_string(),
            body,
        }
    }

    /// Sends the password reset mail.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
        ttl_minutes: i64,
    ) -> Result<(), EmailError> {
        let content = self.password_reset_content(to_name, token, ttl_minutes);
        self.send_email(to_email, &content.subject, &content.body)
            .await
    }

    /// Sends a generic email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_config_default() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
    }

    #[test]
    fn test_reset_url_uses_recovery_form() {
        let service = EmailService::new(EmailConfig {
            frontend_url: "https://app.example.com/".to_string(),
            ..EmailConfig::default()
        });

        assert_eq!(
            service.password_reset_url("abc123"),
            "https://app.example.com/reset-password?token_hash=abc123&type=recovery"
        );
    }

    #[test]
    fn test_reset_content_mentions_link_and_ttl() {
        let service = EmailService::new(EmailConfig::default());
        let content = service.password_reset_content("Ada", "tok", 45);

        assert!(content.subject.contains("Reset"));
        assert!(content.body.starts_with("Hi Ada,"));
        assert!(content.body.contains("token_hash=tok&type=recovery"));
        assert!(content.body.contains("45 minutes"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected_before_send() {
        let service = EmailService::new(EmailConfig::default());
        let result = service.send_email("not-an-address", "s", "b").await;
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }
}
