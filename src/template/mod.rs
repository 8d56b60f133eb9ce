//! Mail templates and their provider.
//!
//! A mail template is a preset for an outgoing mail, bound to one mail type.
//! Subject, body and sender fields carry `[[variable]]` tokens that are
//! resolved at send time; the recipients list carries bare recipient keys.
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryTemplateStore::new();
//!
//! let mut template = store.create_mail_template("en");
//! template.id = "user-registered".to_string();
//! template.mail_type = registered_type;
//! template.name = "User registered".to_string();
//! template.subject = "Welcome [[userName]]".to_string();
//! template.body = "<p>Hello [[userName]]</p>".to_string();
//! template.recipients = vec!["userEmail".to_string()];
//!
//! store.save_mail_template(template)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MailError, Result};
use crate::mailtype::MailType;

/// A mail template: concrete content bound to one mail type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailTemplate {
    /// Template identifier, unique per locale
    pub id: String,

    /// Locale code this template is written for
    pub locale: String,

    /// The mail type declaring which variables this template may use
    pub mail_type: Arc<MailType>,

    /// Human-readable template name
    pub name: String,

    /// Subject line, may contain `[[variable]]` tokens
    pub subject: String,

    /// Body rendered as HTML, may contain `[[variable]]` tokens
    pub body: String,

    /// Relative or absolute attachment paths, resolved lazily at send time
    #[serde(default)]
    pub attachments: Vec<String>,

    /// Display name of the sender, may contain `[[variable]]` tokens
    /// resolved from the content variables
    pub sender_name: String,

    /// Sender address, may contain `[[variable]]` tokens resolved from the
    /// recipient variables
    pub sender_email: String,

    /// Recipient keys of the mail type, substituted with bare-key
    /// replacement into the To addresses
    #[serde(default)]
    pub recipients: Vec<String>,

    /// CC entries: address key mapped to "address" or "Name <address>",
    /// values token-substituted with the recipient variables
    #[serde(default)]
    pub cc: IndexMap<String, String>,

    /// BCC entries, same shape as `cc`
    #[serde(default)]
    pub bcc: IndexMap<String, String>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl MailTemplate {
    /// Symbol opening a variable token
    pub const VARIABLE_OPEN: &'static str = "[[";

    /// Symbol closing a variable token
    pub const VARIABLE_CLOSE: &'static str = "]]";

    /// Validate the template before it enters a store
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() || self.id.len() > 64 {
            return Err(MailError::InvalidTemplate(
                "id must be 1-64 characters".to_string(),
            ));
        }

        if !self
            .id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(MailError::InvalidTemplate(
                "id must contain only alphanumeric, dash, underscore or dot".to_string(),
            ));
        }

        if self.locale.is_empty() {
            return Err(MailError::InvalidTemplate(
                "locale must not be empty".to_string(),
            ));
        }

        if self.mail_type.name.is_empty() {
            return Err(MailError::InvalidTemplate(
                "template is not bound to a mail type".to_string(),
            ));
        }

        Ok(())
    }
}

/// Options for fetching templates from a provider.
#[derive(Debug, Clone, Default)]
pub struct TemplateQuery {
    /// Restrict to a locale
    pub locale: Option<String>,

    /// Substring match against template id and name
    pub query: Option<String>,

    /// Maximum number of templates to return
    pub limit: Option<usize>,

    /// Number of matching templates to skip
    pub offset: Option<usize>,
}

/// Data source for mail templates.
pub trait MailTemplateProvider: Send + Sync {
    /// Look up a template by id and locale
    fn mail_template(&self, id: &str, locale: &str) -> Result<MailTemplate>;

    /// Fetch templates matching the query, keyed by template id
    fn mail_templates(&self, query: &TemplateQuery) -> HashMap<String, MailTemplate>;

    /// Fetch the templates bound to a mail type, keyed by template id
    fn mail_templates_for_type(
        &self,
        mail_type: &MailType,
        locale: Option<&str>,
    ) -> HashMap<String, MailTemplate>;

    /// Create a blank template draft for the locale. The draft is not
    /// stored until it is saved.
    fn create_mail_template(&self, locale: &str) -> MailTemplate;

    /// Save a template in the data store
    fn save_mail_template(&self, template: MailTemplate) -> Result<()>;

    /// Delete a template from the data store
    fn delete_mail_template(&self, template: &MailTemplate) -> Result<()>;
}

/// In-memory template store, keyed by `(id, locale)`.
pub struct MemoryTemplateStore {
    templates: DashMap<(String, String), MailTemplate>,
}

impl Default for MemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.templates.len()
    }

    fn matches(template: &MailTemplate, query: &TemplateQuery) -> bool {
        if let Some(locale) = &query.locale {
            if &template.locale != locale {
                return false;
            }
        }

        if let Some(needle) = &query.query {
            if !template.id.contains(needle.as_str()) && !template.name.contains(needle.as_str()) {
                return false;
            }
        }

        true
    }
}

impl MailTemplateProvider for MemoryTemplateStore {
    fn mail_template(&self, id: &str, locale: &str) -> Result<MailTemplate> {
        self.templates
            .get(&(id.to_string(), locale.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MailError::TemplateNotFound {
                id: id.to_string(),
                locale: locale.to_string(),
            })
    }

    fn mail_templates(&self, query: &TemplateQuery) -> HashMap<String, MailTemplate> {
        let mut matching: Vec<MailTemplate> = self
            .templates
            .iter()
            .filter(|entry| Self::matches(entry.value(), query))
            .map(|entry| entry.value().clone())
            .collect();

        // Stable order so limit/offset paging is deterministic
        matching.sort_by(|a, b| (&a.id, &a.locale).cmp(&(&b.id, &b.locale)));

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);

        matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|template| (template.id.clone(), template))
            .collect()
    }

    fn mail_templates_for_type(
        &self,
        mail_type: &MailType,
        locale: Option<&str>,
    ) -> HashMap<String, MailTemplate> {
        self.templates
            .iter()
            .filter(|entry| entry.value().mail_type.name == mail_type.name)
            .filter(|entry| locale.is_none_or(|locale| entry.value().locale == locale))
            .map(|entry| (entry.value().id.clone(), entry.value().clone()))
            .collect()
    }

    fn create_mail_template(&self, locale: &str) -> MailTemplate {
        let now = Utc::now();

        MailTemplate {
            id: Uuid::new_v4().to_string(),
            locale: locale.to_string(),
            mail_type: Arc::new(MailType::new("")),
            name: String::new(),
            subject: String::new(),
            body: String::new(),
            attachments: Vec::new(),
            sender_name: String::new(),
            sender_email: String::new(),
            recipients: Vec::new(),
            cc: IndexMap::new(),
            bcc: IndexMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn save_mail_template(&self, mut template: MailTemplate) -> Result<()> {
        template.validate()?;
        template.updated_at = Utc::now();

        self.templates
            .insert((template.id.clone(), template.locale.clone()), template);

        Ok(())
    }

    fn delete_mail_template(&self, template: &MailTemplate) -> Result<()> {
        self.templates
            .remove(&(template.id.clone(), template.locale.clone()))
            .map(|_| ())
            .ok_or_else(|| MailError::TemplateNotFound {
                id: template.id.clone(),
                locale: template.locale.clone(),
            })
    }
}
