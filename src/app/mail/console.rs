use async_trait::async_trait;

use super::{EmailError, EmailMessage, EmailSender};

/// Development mailer: writes the message to the log instead of sending it.
#[derive(Debug)]
pub struct ConsoleMailer;

#[async_trait]
impl EmailSender for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to.as_str(),
            from = %message.from,
            subject = %message.subject,
            "mail (console adapter)\n{}",
            message.html_body
        );
        Ok(())
    }
}
