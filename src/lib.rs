//! Mail template rendering and dispatch.
//!
//! Business logic fires a named mail event with content and recipient
//! variable maps; this crate validates the maps against the mail type
//! contract, substitutes the variables into the bound template, assembles a
//! message and hands it to a pluggable transport.

// Domain layer (contracts and rendering)
pub mod mailtype;
pub mod message;
pub mod resolver;
pub mod template;

// Orchestration layer
pub mod handler;
pub mod service;

// Collaborators
pub mod file;
pub mod transport;

// Supporting modules
pub mod config;
pub mod error;

pub use error::{MailError, Result};
pub use file::{FileHandle, FileLookup, FileSystemLookup};
pub use handler::{GenericMailHandler, MailHandler};
pub use mailtype::{MailType, MailTypeProvider, MemoryMailTypeProvider};
pub use message::{Message, MessageBuilder};
pub use resolver::{SubstitutionMode, VariableMap};
pub use service::{MailService, TemplateRef};
pub use template::{MailTemplate, MailTemplateProvider, MemoryTemplateStore, TemplateQuery};
pub use transport::{MemoryTransport, SmtpTransport, Transport, TransportError};
