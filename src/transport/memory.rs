//! In-memory transport.
//!
//! Records every message instead of delivering it. Used by the test suite
//! and for local development where no mail should leave the machine.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::message::Message;

use super::{Transport, TransportError};

/// Transport that keeps sent messages in memory.
#[derive(Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<Message>>,
    failure: Mutex<Option<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with the given reason
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(reason.into());
    }

    /// Messages sent so far
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(TransportError::Delivery(reason));
        }

        tracing::debug!(
            message_id = %message.id,
            subject = %message.subject,
            "Message recorded by memory transport"
        );

        self.sent.lock().unwrap().push(message);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::message::MessageBuilder;

    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let transport = MemoryTransport::new();

        let message = transport.create_message().subject("Hi").build();
        transport.send(message).await.unwrap();

        assert_eq!(transport.sent_count(), 1);
        assert_eq!(transport.sent()[0].subject, "Hi");
    }

    #[tokio::test]
    async fn test_forced_failure() {
        let transport = MemoryTransport::new();
        transport.fail_with("wire down");

        let result = transport.send(MessageBuilder::new().build()).await;
        assert!(matches!(result, Err(TransportError::Delivery(reason)) if reason == "wire down"));
        assert_eq!(transport.sent_count(), 0);
    }
}
