//! Integration tests for the full send pipeline
//!
//! These tests wire the real providers, handler and memory transport
//! together and drive sends through the service facade, the way an
//! application would.

use std::sync::Arc;

use mail_dispatch::file::FileSystemLookup;
use mail_dispatch::{
    GenericMailHandler, MailError, MailService, MailType, MailTemplateProvider,
    MemoryMailTypeProvider, MemoryTemplateStore, MemoryTransport, VariableMap,
};

struct TestSetup {
    service: MailService,
    transport: Arc<MemoryTransport>,
    _attachment_dir: tempfile::TempDir,
}

fn init_tracing() {
    use std::sync::Once;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Helper to wire a complete pipeline with one registered mail type and
/// one saved template
fn create_test_pipeline() -> TestSetup {
    init_tracing();

    let attachment_dir = tempfile::tempdir().unwrap();
    std::fs::write(attachment_dir.path().join("terms.pdf"), b"pdf").unwrap();

    let type_provider = Arc::new(MemoryMailTypeProvider::new());
    let mail_type = type_provider.register(
        MailType::new("user.registered")
            .content_variable("userName", "Name of the user")
            .recipient_variable("userEmail", "Email address of the user"),
    );

    let template_provider = Arc::new(MemoryTemplateStore::new());
    let mut template = template_provider.create_mail_template("en");
    template.id = "user-registered".to_string();
    template.mail_type = mail_type;
    template.name = "User registered".to_string();
    template.subject = "Welcome [[userName]]".to_string();
    template.body = "<p>Hello [[userName]], your account is ready.</p>".to_string();
    template.sender_name = "Example support".to_string();
    template.sender_email = "support@example.com".to_string();
    template.recipients = vec!["userEmail".to_string()];
    template.attachments = vec!["terms.pdf".to_string(), "missing.pdf".to_string()];
    template_provider.save_mail_template(template).unwrap();

    let transport = Arc::new(MemoryTransport::new());
    let file_lookup = Arc::new(FileSystemLookup::new(vec![
        attachment_dir.path().to_path_buf()
    ]));
    let handler = Arc::new(GenericMailHandler::new(
        Arc::clone(&transport) as Arc<dyn mail_dispatch::Transport>,
        file_lookup,
    ));

    let service = MailService::new(type_provider, template_provider, handler);

    TestSetup {
        service,
        transport,
        _attachment_dir: attachment_dir,
    }
}

fn vars(pairs: &[(&str, &str)]) -> VariableMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// End-to-end send
// =============================================================================

#[tokio::test]
async fn test_send_by_id_renders_and_dispatches() {
    let setup = create_test_pipeline();

    setup
        .service
        .send_mail_template(
            &vars(&[("userName", "Alice")]),
            &vars(&[("userEmail", "alice@example.com")]),
            "user-registered",
            Some("en"),
        )
        .await
        .unwrap();

    let sent = setup.transport.sent();
    assert_eq!(sent.len(), 1);

    let message = &sent[0];
    assert_eq!(message.subject, "Welcome Alice");
    assert_eq!(message.body, "<p>Hello Alice, your account is ready.</p>");
    assert!(message.html);
    assert_eq!(message.to, vec!["alice@example.com"]);
    assert_eq!(
        message.reply_to.as_deref(),
        Some("Example support <support@example.com>")
    );

    // One of the two attachment paths resolves; the other is skipped
    // without failing the send
    assert_eq!(message.attachments.len(), 1);
    assert_eq!(message.attachments[0].name, "terms.pdf");
}

#[tokio::test]
async fn test_send_by_instance() {
    let setup = create_test_pipeline();
    let template = setup
        .service
        .mail_template_provider()
        .mail_template("user-registered", "en")
        .unwrap();

    setup
        .service
        .send_mail_template(
            &vars(&[("userName", "Bob")]),
            &vars(&[("userEmail", "bob@example.com")]),
            template,
            None,
        )
        .await
        .unwrap();

    assert_eq!(setup.transport.sent_count(), 1);
}

// =============================================================================
// Validation failures
// =============================================================================

#[tokio::test]
async fn test_missing_content_variable_sends_nothing() {
    let setup = create_test_pipeline();

    let err = setup
        .service
        .send_mail_template(
            &VariableMap::new(),
            &vars(&[("userEmail", "alice@example.com")]),
            "user-registered",
            Some("en"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MailError::MissingContentVariable(name) if name == "userName"));
    assert_eq!(setup.transport.sent_count(), 0);
}

#[tokio::test]
async fn test_id_without_locale() {
    let setup = create_test_pipeline();

    let err = setup
        .service
        .send_mail_template(
            &vars(&[("userName", "Alice")]),
            &vars(&[("userEmail", "alice@example.com")]),
            "user-registered",
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MailError::MissingLocale));
    assert_eq!(setup.transport.sent_count(), 0);
}

#[tokio::test]
async fn test_unknown_locale() {
    let setup = create_test_pipeline();

    let err = setup
        .service
        .send_mail_template(
            &vars(&[("userName", "Alice")]),
            &vars(&[("userEmail", "alice@example.com")]),
            "user-registered",
            Some("nl"),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MailError::TemplateNotFound { id, locale } if id == "user-registered" && locale == "nl"
    ));
}

// =============================================================================
// Concurrent sends against shared template data
// =============================================================================

#[tokio::test]
async fn test_concurrent_sends() {
    let setup = Arc::new(create_test_pipeline());

    let mut handles = Vec::new();
    for i in 0..8 {
        let setup = Arc::clone(&setup);
        handles.push(tokio::spawn(async move {
            setup
                .service
                .send_mail_template(
                    &vars(&[("userName", &format!("User {i}"))]),
                    &vars(&[("userEmail", &format!("user{i}@example.com"))]),
                    "user-registered",
                    Some("en"),
                )
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(setup.transport.sent_count(), 8);
}
