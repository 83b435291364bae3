use async_trait::async_trait;

use super::{EmailError, EmailMessage, EmailSender};

/// Mailer used when no provider is configured. Drops every message.
#[derive(Debug)]
pub struct NoopMailer;

#[async_trait]
impl EmailSender for NoopMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::warn!(
            to = %message.to.as_str(),
            subject = %message.subject,
            "no mail provider configured, message dropped"
        );
        Ok(())
    }
}
