//! Outgoing mail.
//!
//! Delivery is behind the [`Mailer`] trait; the default [`LogMailer`] only
//! records the message through `tracing`.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<()> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Mail sent: {}",
            message.body
        );
        Ok(())
    }
}

/// Message asking a freshly registered user to confirm their address.
#[must_use]
pub fn confirmation_message(config: &MailConfig, to: &str, username: &str, token: &str) -> MailMessage {
    MailMessage {
        from: format!("{} <{}>", config.sender_name, config.sender_address),
        to: to.to_string(),
        subject: format!("{} Confirm your account", config.subject_prefix),
        body: format!(
            "Hello {username},\n\nConfirm your account by sending this token to \
             POST /api/users/confirm:\n\n{token}\n"
        ),
    }
}
