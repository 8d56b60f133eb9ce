use thiserror::Error;

use crate::transport::TransportError;

/// Error type for the mail pipeline.
///
/// Validation errors are raised before any substitution or dispatch happens;
/// lookup and transport failures are surfaced to the caller unchanged.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Content variable missing: {0}")]
    MissingContentVariable(String),

    #[error("Recipient variable missing: {0}")]
    MissingRecipientVariable(String),

    #[error("Could not fetch the mail template: no locale provided")]
    MissingLocale,

    #[error("Mail template not found: {id} (locale {locale})")]
    TemplateNotFound { id: String, locale: String },

    #[error("Mail type not found: {0}")]
    TypeNotFound(String),

    #[error("Invalid mail template: {0}")]
    InvalidTemplate(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type for mail operations
pub type Result<T> = std::result::Result<T, MailError>;
