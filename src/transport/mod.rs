//! Transport abstraction for dispatching assembled messages.
//!
//! The core depends only on the [`Transport`] trait, not on a specific wire
//! protocol. Two implementations ship with the crate: an in-memory transport
//! for tests and local development, and an SMTP transport built on lettre.

mod memory;
mod smtp;

pub use memory::MemoryTransport;
pub use smtp::SmtpTransport;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::{Message, MessageBuilder};

/// Error types for transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// The message could not be turned into a wire format
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// The transport failed to deliver the message
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Dispatches assembled messages.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Start a message for this transport. The default is an empty builder;
    /// a transport may pre-seed defaults.
    fn create_message(&self) -> MessageBuilder {
        MessageBuilder::new()
    }

    /// Deliver the message. One call per send operation, no retry at this
    /// layer.
    async fn send(&self, message: Message) -> Result<(), TransportError>;
}
