//! Mail types and their provider.
//!
//! A mail type is a named contract for a class of outgoing mail events
//! ("user registered", "order shipped", ...). It declares which content
//! variables and which recipient variables must be supplied when a mail of
//! this type is sent. Templates bind to a mail type; the handler validates
//! the caller's variable maps against it before anything is rendered.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{MailError, Result};
use crate::resolver::VariableMap;

/// Contract declaring the variables a mail event requires.
///
/// Immutable once registered. The maps are ordered: declaration order is the
/// order validation reports missing keys in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MailType {
    /// Machine name of the mail type
    pub name: String,

    /// Content variables: variable name as key, human-readable label as
    /// value. Available to subject, body and other informational fields.
    pub content_variables: VariableMap,

    /// Recipient variables: recipient key as key, human-readable label as
    /// value. Resolved into real addresses at send time.
    pub recipient_variables: VariableMap,
}

impl MailType {
    /// Create a mail type without any declared variables
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_variables: VariableMap::new(),
            recipient_variables: VariableMap::new(),
        }
    }

    /// Declare a content variable
    pub fn content_variable(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.content_variables.insert(name.into(), label.into());
        self
    }

    /// Declare a recipient variable
    pub fn recipient_variable(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.recipient_variables.insert(name.into(), label.into());
        self
    }
}

/// Data source for the available mail types.
pub trait MailTypeProvider: Send + Sync {
    /// All known mail types, keyed by machine name
    fn mail_types(&self) -> HashMap<String, Arc<MailType>>;

    /// Look up a single mail type by machine name
    fn mail_type(&self, name: &str) -> Result<Arc<MailType>>;
}

/// In-memory mail type registry.
pub struct MemoryMailTypeProvider {
    types: DashMap<String, Arc<MailType>>,
}

impl Default for MemoryMailTypeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMailTypeProvider {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    /// Register a mail type, replacing any previous definition with the
    /// same name. Returns the shared handle templates should reference.
    pub fn register(&self, mail_type: MailType) -> Arc<MailType> {
        let mail_type = Arc::new(mail_type);
        self.types
            .insert(mail_type.name.clone(), Arc::clone(&mail_type));
        mail_type
    }

    pub fn count(&self) -> usize {
        self.types.len()
    }
}

impl MailTypeProvider for MemoryMailTypeProvider {
    fn mail_types(&self) -> HashMap<String, Arc<MailType>> {
        self.types
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    fn mail_type(&self, name: &str) -> Result<Arc<MailType>> {
        self.types
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MailError::TypeNotFound(name.to_string()))
    }
}
