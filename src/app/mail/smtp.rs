use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, Tokio1Executor,
};

use super::{EmailError, EmailMessage, EmailSender};

/// Upper bound on one SMTP conversation.
const SMTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// SMTP email sender. Messages go out as HTML.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer. Credentials are used only when both are present.
    pub fn new(
        host: String,
        port: u16,
        user: Option<String>,
        pass: Option<String>,
        from: String,
    ) -> Result<Self, EmailError> {
        let mut transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
            .port(port)
            .timeout(Some(SMTP_TIMEOUT));

        if let (Some(user), Some(pass)) = (user, pass) {
            transport = transport.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            transport: transport.build(),
            from,
        })
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let sender = if message.from.is_empty() { &self.from } else { &message.from };
        let from: Mailbox = sender.parse()
            .map_err(|e| EmailError::Config(format!("Invalid from address '{}': {}", sender, e)))?;

        let to: Mailbox = message.to.as_str().parse()
            .map_err(|e| EmailError::Config(format!("Invalid to address '{}': {}", message.to.as_str(), e)))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .map_err(|e| EmailError::Send(format!("Failed to build email message: {}", e)))?;

        lettre::AsyncTransport::send(&self.transport, email).await
            .map(|_| ())
            .map_err(|e| EmailError::Smtp(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }
}