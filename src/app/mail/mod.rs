use std::sync::Arc;

use crate::app::domain::Email;

/// Message to be sent via any email implementation.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: Email,
    pub subject: String,
    pub html_body: String,
    pub from: String,
}

impl EmailMessage {
    pub fn new(to: Email, subject: impl Into<String>, html_body: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            html_body: html_body.into(),
            from: from.into(),
        }
    }
}

/// Abstract interface for sending email. Swappable per environment.
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Errors that can occur during email sending.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Send error: {0}")]
    Send(String),
}

pub use console::ConsoleMailer;
pub use noop::NoopMailer;
pub use smtp::SmtpMailer;

mod console;
mod noop;
mod smtp;

/// Build the email sender from config.
///
/// A provider that is selected but not configured degrades to `NoopMailer`
/// with a warning; mail is never a reason to refuse startup.
pub fn from_config(config: &crate::app::config::Config) -> Result<Arc<dyn EmailSender>, EmailError> {
    match config.mail_adapter.as_str() {
        "console" => Ok(Arc::new(ConsoleMailer)),
        "smtp" => {
            let Some(host) = config.smtp_host.clone() else {
                tracing::warn!("MAIL_ADAPTER=smtp but SMTP_HOST is not set; outgoing mail is disabled");
                return Ok(Arc::new(NoopMailer));
            };

            Ok(Arc::new(SmtpMailer::new(
                host,
                config.smtp_port,
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
                config.mail_from.clone(),
            )?))
        }
        "none" => Ok(Arc::new(NoopMailer)),
        _ => Err(EmailError::Config(format!(
            "Unknown MAIL_ADAPTER: {}",
            config.mail_adapter
        ))),
    }
}

/// Send and report the outcome without failing the caller.
/// Returns whether delivery was accepted.
pub async fn send_best_effort(sender: &dyn EmailSender, message: &EmailMessage) -> bool {
    match sender.send(message).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(to = %message.to.as_str(), subject = %message.subject, %err, "email not delivered");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::Config;

    struct FailingMailer;

    #[async_trait::async_trait]
    impl EmailSender for FailingMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<(), EmailError> {
            Err(EmailError::Send("provider down".to_string()))
        }
    }

    fn message() -> EmailMessage {
        EmailMessage::new(
            Email::new("owner@example.com".to_string()).unwrap(),
            "Welcome",
            "<p>hi</p>",
            "noreply@example.com",
        )
    }

    #[test]
    fn smtp_without_host_degrades_to_noop() {
        let mut config = Config::for_tests();
        config.mail_adapter = "smtp".to_string();
        config.smtp_host = None;
        assert!(from_config(&config).is_ok());
    }

    #[test]
    fn unknown_adapter_is_a_config_error() {
        let mut config = Config::for_tests();
        config.mail_adapter = "carrier-pigeon".to_string();
        assert!(matches!(from_config(&config), Err(EmailError::Config(_))));
    }

    #[tokio::test]
    async fn best_effort_reports_without_failing() {
        assert!(!send_best_effort(&FailingMailer, &message()).await);
        assert!(send_best_effort(&NoopMailer, &message()).await);
        assert!(send_best_effort(&ConsoleMailer, &message()).await);
    }
}
