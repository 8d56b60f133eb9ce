//! Mail service facade.
//!
//! Thin indirection over the handler: callers can reference a template
//! either by instance or by id plus locale, in which case the template is
//! fetched from the template provider first.

use std::sync::Arc;

use crate::error::{MailError, Result};
use crate::handler::MailHandler;
use crate::mailtype::MailTypeProvider;
use crate::resolver::VariableMap;
use crate::template::{MailTemplate, MailTemplateProvider};

/// Reference to a mail template: an instance, or an id to resolve against
/// a locale.
pub enum TemplateRef {
    Instance(Box<MailTemplate>),
    Id(String),
}

impl From<MailTemplate> for TemplateRef {
    fn from(template: MailTemplate) -> Self {
        TemplateRef::Instance(Box::new(template))
    }
}

impl From<&str> for TemplateRef {
    fn from(id: &str) -> Self {
        TemplateRef::Id(id.to_string())
    }
}

impl From<String> for TemplateRef {
    fn from(id: String) -> Self {
        TemplateRef::Id(id)
    }
}

/// Service tying the providers and the handler together.
pub struct MailService {
    mail_type_provider: Arc<dyn MailTypeProvider>,
    mail_template_provider: Arc<dyn MailTemplateProvider>,
    handler: Arc<dyn MailHandler>,
}

impl MailService {
    pub fn new(
        mail_type_provider: Arc<dyn MailTypeProvider>,
        mail_template_provider: Arc<dyn MailTemplateProvider>,
        handler: Arc<dyn MailHandler>,
    ) -> Self {
        Self {
            mail_type_provider,
            mail_template_provider,
            handler,
        }
    }

    /// Get the mail type provider
    pub fn mail_type_provider(&self) -> &Arc<dyn MailTypeProvider> {
        &self.mail_type_provider
    }

    /// Get the mail template provider
    pub fn mail_template_provider(&self) -> &Arc<dyn MailTemplateProvider> {
        &self.mail_template_provider
    }

    /// Render and send a mail template.
    ///
    /// When `template` is an id, `locale` is required to fetch the template
    /// from the provider; referencing an id without a locale fails with
    /// [`MailError::MissingLocale`] before the provider is consulted.
    #[tracing::instrument(name = "service.send_mail_template", skip_all)]
    pub async fn send_mail_template(
        &self,
        content_variables: &VariableMap,
        recipient_variables: &VariableMap,
        template: impl Into<TemplateRef>,
        locale: Option<&str>,
    ) -> Result<()> {
        let template = match template.into() {
            TemplateRef::Instance(template) => *template,
            TemplateRef::Id(id) => {
                let locale = locale.ok_or(MailError::MissingLocale)?;
                self.mail_template_provider.mail_template(&id, locale)?
            }
        };

        self.handler
            .send_mail(&template, content_variables, recipient_variables)
            .await
    }
}
