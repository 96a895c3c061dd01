//! Outgoing email
//!
//! Handlers talk to a [`Mailer`]. [`SmtpMailer`] delivers through a real
//! relay; [`LogMailer`] only logs, and is what the server falls back to when
//! no SMTP host is configured.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub mod smtp;
pub mod templates;

pub use smtp::{SmtpConfig, SmtpMailer};

/// A rendered email ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Email delivery errors
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Invalid address '{0}'")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Transport(String),
}

/// Something that can deliver an [`EmailMessage`]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Mailer that writes messages to the log instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "SMTP not configured, email not delivered:\n{}",
            message.text
        );
        Ok(())
    }
}
