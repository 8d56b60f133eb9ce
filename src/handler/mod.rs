//! Send orchestration.
//!
//! [`GenericMailHandler`] is the only component with side effects: it
//! validates the caller's variable maps against the template's mail type,
//! substitutes variables into every field, assembles the message, resolves
//! attachments through the file lookup and hands the result to the
//! transport. Validation happens before any substitution, so an incomplete
//! variable map never produces a partially built message.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{MailError, Result};
use crate::file::FileLookup;
use crate::resolver::{self, SubstitutionMode, VariableMap};
use crate::template::MailTemplate;
use crate::transport::Transport;

/// Performs the sending of a mail.
///
/// Whether that happens directly, through a queue or some other channel is
/// up to the transport behind the implementation.
#[async_trait]
pub trait MailHandler: Send + Sync {
    /// Render the template with the provided variable maps and dispatch the
    /// resulting message. Every variable declared by the template's mail
    /// type must be present in the corresponding map.
    async fn send_mail(
        &self,
        template: &MailTemplate,
        content_variables: &VariableMap,
        recipient_variables: &VariableMap,
    ) -> Result<()>;
}

/// Counters for the mail handler
#[derive(Debug, Default)]
pub struct HandlerStats {
    /// Messages handed to the transport successfully
    pub sent: AtomicU64,
    /// Sends that failed validation or dispatch
    pub failed: AtomicU64,
    /// Attachment paths the file lookup could not resolve
    pub attachments_skipped: AtomicU64,
}

impl HandlerStats {
    pub fn snapshot(&self) -> HandlerStatsSnapshot {
        HandlerStatsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            attachments_skipped: self.attachments_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of handler statistics
#[derive(Debug, Clone, Serialize)]
pub struct HandlerStatsSnapshot {
    pub sent: u64,
    pub failed: u64,
    pub attachments_skipped: u64,
}

/// Generic implementation of [`MailHandler`].
pub struct GenericMailHandler {
    transport: Arc<dyn Transport>,
    file_lookup: Arc<dyn FileLookup>,
    stats: HandlerStats,
}

impl GenericMailHandler {
    pub fn new(transport: Arc<dyn Transport>, file_lookup: Arc<dyn FileLookup>) -> Self {
        Self {
            transport,
            file_lookup,
            stats: HandlerStats::default(),
        }
    }

    /// Get handler statistics
    pub fn stats(&self) -> HandlerStatsSnapshot {
        self.stats.snapshot()
    }
}

#[async_trait]
impl MailHandler for GenericMailHandler {
    #[tracing::instrument(
        name = "handler.send_mail",
        skip(self, template, content_variables, recipient_variables),
        fields(template_id = %template.id, mail_type = %template.mail_type.name)
    )]
    async fn send_mail(
        &self,
        template: &MailTemplate,
        content_variables: &VariableMap,
        recipient_variables: &VariableMap,
    ) -> Result<()> {
        let mail_type = &template.mail_type;

        if let Err(missing) =
            resolver::validate_required(&mail_type.content_variables, content_variables)
        {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
            return Err(MailError::MissingContentVariable(missing.0));
        }

        if let Err(missing) =
            resolver::validate_required(&mail_type.recipient_variables, recipient_variables)
        {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
            return Err(MailError::MissingRecipientVariable(missing.0));
        }

        // The sender display name is informational and resolves from the
        // content variables; the sender address is an identity and resolves
        // from the recipient variables.
        let sender_name =
            resolver::substitute(content_variables, &template.sender_name, SubstitutionMode::Token);
        let sender_email = resolver::substitute(
            recipient_variables,
            &template.sender_email,
            SubstitutionMode::Token,
        );
        let reply_to = format!("{sender_name} <{sender_email}>");

        let subject =
            resolver::substitute(content_variables, &template.subject, SubstitutionMode::Token);
        let body =
            resolver::substitute(content_variables, &template.body, SubstitutionMode::Token);

        // The recipients list holds raw recipient keys, not delimited tokens
        let to = resolver::substitute_all(
            recipient_variables,
            Some(&template.recipients),
            SubstitutionMode::Bare,
        );

        let cc_values: Vec<String> = template.cc.values().cloned().collect();
        let cc =
            resolver::substitute_all(recipient_variables, Some(&cc_values), SubstitutionMode::Token);

        let bcc_values: Vec<String> = template.bcc.values().cloned().collect();
        let bcc = resolver::substitute_all(
            recipient_variables,
            Some(&bcc_values),
            SubstitutionMode::Token,
        );

        let mut builder = self
            .transport
            .create_message()
            .html(true)
            .reply_to(reply_to)
            .subject(subject)
            .body(body)
            .to(to)
            .cc(cc)
            .bcc(bcc);

        for path in &template.attachments {
            match self.file_lookup.get_file(path) {
                Some(file) => builder = builder.attach(file),
                None => {
                    self.stats.attachments_skipped.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        template_id = %template.id,
                        path = %path,
                        "Attachment not found, skipping"
                    );
                }
            }
        }

        let message = builder.build();
        let message_id = message.id;

        match self.transport.send(message).await {
            Ok(()) => {
                self.stats.sent.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    message_id = %message_id,
                    template_id = %template.id,
                    "Mail dispatched"
                );
                Ok(())
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                Err(e.into())
            }
        }
    }
}
