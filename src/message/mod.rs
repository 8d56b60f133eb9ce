//! The assembled mail message.
//!
//! A [`Message`] is transient: it is built once per send from a resolved
//! template, handed to the transport and then discarded. Builders come from
//! [`Transport::create_message`](crate::transport::Transport::create_message)
//! so a transport can pre-seed defaults.

use serde::Serialize;
use uuid::Uuid;

use crate::file::FileHandle;

/// A fully resolved mail message, ready for transport hand-off.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Unique identifier for this send, used in logs
    pub id: Uuid,

    /// Reply-to header value ("Name <address>")
    pub reply_to: Option<String>,

    /// Resolved subject line
    pub subject: String,

    /// Resolved body
    pub body: String,

    /// Whether the body is HTML
    pub html: bool,

    /// Resolved To addresses
    pub to: Vec<String>,

    /// Resolved CC addresses
    pub cc: Vec<String>,

    /// Resolved BCC addresses
    pub bcc: Vec<String>,

    /// Resolved attachment files
    pub attachments: Vec<FileHandle>,
}

/// Builder for [`Message`].
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message: Message,
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            message: Message {
                id: Uuid::new_v4(),
                reply_to: None,
                subject: String::new(),
                body: String::new(),
                html: false,
                to: Vec::new(),
                cc: Vec::new(),
                bcc: Vec::new(),
                attachments: Vec::new(),
            },
        }
    }

    /// Mark the body as HTML
    pub fn html(mut self, html: bool) -> Self {
        self.message.html = html;
        self
    }

    /// Set the reply-to header
    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.message.reply_to = Some(reply_to.into());
        self
    }

    /// Set the subject line
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.message.subject = subject.into();
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.message.body = body.into();
        self
    }

    /// Set the To addresses
    pub fn to(mut self, to: Vec<String>) -> Self {
        self.message.to = to;
        self
    }

    /// Set the CC addresses
    pub fn cc(mut self, cc: Vec<String>) -> Self {
        self.message.cc = cc;
        self
    }

    /// Set the BCC addresses
    pub fn bcc(mut self, bcc: Vec<String>) -> Self {
        self.message.bcc = bcc;
        self
    }

    /// Attach a resolved file
    pub fn attach(mut self, file: FileHandle) -> Self {
        self.message.attachments.push(file);
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}
