//! SMTP transport built on lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::message::Message;

use super::{Transport, TransportError};

/// Transport delivering messages through an SMTP relay.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    default_sender: Option<String>,
}

impl SmtpTransport {
    /// Build the transport from settings.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, TransportError> {
        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| TransportError::InvalidMessage(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        builder = builder.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            default_sender: config.sender.clone(),
        })
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    #[tracing::instrument(name = "smtp.send", skip(self, message), fields(message_id = %message.id))]
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        let email = build_email(&message, self.default_sender.as_deref()).await?;

        self.mailer
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::Delivery(e.to_string()))?;

        tracing::debug!(
            message_id = %message.id,
            recipients = message.to.len(),
            "Message handed to SMTP relay"
        );

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .parse()
        .map_err(|_| TransportError::InvalidMessage(format!("invalid address: {address}")))
}

/// Convert an assembled [`Message`] into a lettre message.
///
/// The reply-to value doubles as the sender; `fallback_sender` is used when
/// a message carries no reply-to.
async fn build_email(
    message: &Message,
    fallback_sender: Option<&str>,
) -> Result<lettre::Message, TransportError> {
    let sender = message
        .reply_to
        .as_deref()
        .or(fallback_sender)
        .ok_or_else(|| TransportError::InvalidMessage("no sender address".to_string()))?;
    let sender = parse_mailbox(sender)?;

    let mut builder = lettre::Message::builder()
        .from(sender.clone())
        .reply_to(sender)
        .subject(&message.subject);

    for address in &message.to {
        builder = builder.to(parse_mailbox(address)?);
    }
    for address in &message.cc {
        builder = builder.cc(parse_mailbox(address)?);
    }
    for address in &message.bcc {
        builder = builder.bcc(parse_mailbox(address)?);
    }

    let content_type = if message.html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };

    let body_part = SinglePart::builder()
        .header(content_type)
        .body(message.body.clone());

    let email = if message.attachments.is_empty() {
        builder
            .singlepart(body_part)
            .map_err(|e| TransportError::InvalidMessage(e.to_string()))?
    } else {
        let mut multipart = MultiPart::mixed().singlepart(body_part);

        for file in &message.attachments {
            let content = tokio::fs::read(&file.path).await.map_err(|e| {
                TransportError::InvalidMessage(format!(
                    "could not read attachment {}: {e}",
                    file.path.display()
                ))
            })?;

            let content_type = ContentType::parse("application/octet-stream")
                .map_err(|e| TransportError::InvalidMessage(e.to_string()))?;

            multipart = multipart.singlepart(
                Attachment::new(file.name.clone()).body(content, content_type),
            );
        }

        builder
            .multipart(multipart)
            .map_err(|e| TransportError::InvalidMessage(e.to_string()))?
    };

    Ok(email)
}
