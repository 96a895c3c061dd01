//! SMTP delivery using lettre

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use std::env;
use tracing::{error, info};

use super::{EmailError, EmailMessage, Mailer};

/// SMTP configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Load SMTP configuration from environment variables
    ///
    /// Returns `None` when `SMTP_HOST` is unset, meaning mail is only logged.
    pub fn from_env() -> Result<Option<Self>> {
        let Some(host) = env::var("SMTP_HOST").ok().filter(|host| !host.is_empty()) else {
            return Ok(None);
        };

        let port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .context("Invalid SMTP_PORT")?;

        let username = env::var("SMTP_USER").ok().filter(|user| !user.is_empty());
        let password = env::var("SMTP_PASS").ok();

        let from_email = env::var("SMTP_FROM")
            .ok()
            .or_else(|| username.clone())
            .context("SMTP_FROM or SMTP_USER must be set when SMTP_HOST is set")?;

        let from_name = env::var("APP_NAME").unwrap_or_else(|_| "E-commerce API".to_string());

        let use_tls = env::var("SMTP_USE_TLS")
            .map(|value| value == "true" || value == "1")
            .unwrap_or(true);

        Ok(Some(Self {
            host,
            port,
            username,
            password,
            from_email,
            from_name,
            use_tls,
        }))
    }
}

/// Mailer backed by an SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a new SMTP mailer
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .context("Failed to create SMTP relay")?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let builder = match (config.username, config.password) {
            (Some(user), password) => {
                builder.credentials(Credentials::new(user, password.unwrap_or_default()))
            }
            (None, _) => builder,
        };

        let transport = builder.port(config.port).build();

        let address: Address = config
            .from_email
            .parse()
            .with_context(|| format!("Invalid sender address '{}'", config.from_email))?;

        info!("SMTP mailer configured for {}:{}", config.host, config.port);

        Ok(Self {
            transport,
            from: Mailbox::new(Some(config.from_name), address),
        })
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, EmailError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| EmailError::Address(message.to.clone()))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ))
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let email = self.build_message(message)?;

        self.transport.send(email).await.map_err(|e| {
            error!("Failed to send email to {}: {}", message.to, e);
            EmailError::Transport(e.to_string())
        })?;

        info!("Email sent successfully to {}", message.to);
        Ok(())
    }
}
