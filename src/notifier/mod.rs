//! Outbound notification delivery.
//!
//! The auth flows only ever talk to the [`Notifier`] trait; delivery failures
//! come back as [`Error::Notification`] and are surfaced once per attempt with
//! no internal retry. [`SmtpNotifier`] is the production transport (lettre
//! over STARTTLS); [`LogNotifier`] logs the verification link instead of
//! sending it, for local development and tests.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::NotifierConfig;
use crate::errors::{Error, Result};

/// Delivers account-lifecycle email to users.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the email-verification link for a pending registration.
    async fn send_verification(&self, to_email: &str, username: &str, token: &str) -> Result<()>;
}

fn verification_link(app_url: &str, token: &str) -> String {
    format!("{}?token={}", app_url, token)
}

fn plain_body(username: &str, link: &str) -> String {
    format!(
        "Hello {},\n\nPlease verify your email by clicking the link below:\n{}\n\n\
         If you didn't request this, you can safely ignore this email.",
        username, link
    )
}

fn html_body(username: &str, link: &str) -> String {
    format!(
        "<html><body>\
         <p>Hello <strong>{}</strong>,</p>\
         <p>Thank you for signing up! Please verify your email by clicking the button below:</p>\
         <p><a href=\"{}\">Verify Email</a></p>\
         <p>If you didn't request this, you can safely ignore this email.</p>\
         </body></html>",
        username, link
    )
}

/// SMTP notifier backed by lettre's async transport.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    app_url: String,
}

impl SmtpNotifier {
    /// Build an SMTP notifier from configuration (STARTTLS relay with
    /// credentials, matching common submission-port setups).
    pub fn from_config(config: &NotifierConfig) -> Result<Self> {
        let sender: Mailbox = config
            .sender
            .parse()
            .map_err(|err| Error::config(format!("Invalid notifier sender address: {}", err)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|err| Error::config(format!("Invalid SMTP relay host: {}", err)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self { transport, sender, app_url: config.app_url.clone() })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_verification(&self, to_email: &str, username: &str, token: &str) -> Result<()> {
        let recipient: Mailbox = to_email
            .parse()
            .map_err(|err| Error::notification(format!("Invalid recipient address: {}", err)))?;

        let link = verification_link(&self.app_url, token);
        let message = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject("TaskEase: Verify Your Email")
            .multipart(MultiPart::alternative_plain_html(
                plain_body(username, &link),
                html_body(username, &link),
            ))
            .map_err(|err| Error::notification(format!("Failed to build email: {}", err)))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| Error::notification(format!("Failed to send email: {}", err)))?;

        debug!(email = %to_email, "verification email sent");
        Ok(())
    }
}

/// Notifier that logs the verification link instead of sending email.
/// Used when no SMTP relay is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier {
    app_url: String,
}

impl LogNotifier {
    pub fn new(app_url: String) -> Self {
        Self { app_url }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification(&self, to_email: &str, username: &str, token: &str) -> Result<()> {
        info!(
            email = %to_email,
            username = %username,
            link = %verification_link(&self.app_url, token),
            "verification email suppressed (log notifier)"
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_link_appends_token_query() {
        assert_eq!(
            verification_link("https://app.example.com/verify-email", "Ab3xYz"),
            "https://app.example.com/verify-email?token=Ab3xYz"
        );
    }

    #[test]
    fn bodies_embed_username_and_link() {
        let plain = plain_body("alice", "https://x/verify?token=T");
        assert!(plain.contains("alice"));
        assert!(plain.contains("https://x/verify?token=T"));

        let html = html_body("alice", "https://x/verify?token=T");
        assert!(html.contains("<strong>alice</strong>"));
        assert!(html.contains("href=\"https://x/verify?token=T\""));
    }
}
