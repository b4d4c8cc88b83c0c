use kbstep_core::{Action, Catalog, CoreError, FieldValue, KnowledgeBase};
use kbstep_engine::{EngineError, FieldError, SessionState};
use kbstep_harness::TestEditor;

type TestResult = Result<(), Box<dyn std::error::Error>>;

// ============================================================================
// Opening a session
// ============================================================================

#[test]
fn new_step_opens_with_default_action() -> TestResult {
    let mut editor = TestEditor::new();
    let session = editor.open()?;

    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.action(), Action::AppendChunk);
    assert!(session.buffer().values().is_empty());
    Ok(())
}

#[test]
fn legacy_dataset_id_is_migrated_on_open() -> TestResult {
    let mut editor = TestEditor::new();
    editor.seed(vec![("dataset_id", FieldValue::from("kb1"))])?;
    let session = editor.open()?;

    let values = session.buffer().values();
    assert_eq!(values.len(), 2);
    assert_eq!(values.get("dataset"), Some(&FieldValue::from("kb1")));
    assert_eq!(values.get("dataset_id"), Some(&FieldValue::from("kb1")));
    Ok(())
}

#[test]
fn unknown_stored_action_rejects_the_step() -> TestResult {
    let mut editor = TestEditor::new();
    editor.seed(vec![("action", FieldValue::from("update_chunk"))])?;

    let err = editor.open().unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, EngineError::Core(CoreError::UnknownAction(ref a)) if a == "update_chunk"));
    Ok(())
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn unknown_field_name_is_fatal() -> TestResult {
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;

    let err = session.set_field("dataset_id", "kb1").unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, EngineError::Core(CoreError::UnknownField(_))));
    assert!(session.buffer().get("dataset_id").is_none());
    Ok(())
}

#[test]
fn unknown_action_leaves_session_unchanged() -> TestResult {
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;
    session.set_action("delete_chunk")?;

    let err = session.set_action("purge_dataset").unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(session.action(), Action::DeleteChunk);
    assert_eq!(session.buffer().discriminator(), "delete_chunk");
    Ok(())
}

#[test]
fn switching_action_and_back_restores_values() -> TestResult {
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;

    session.set_action("replace_document")?;
    session.set_field("chunk_method", "qa")?;
    session.set_field("parse", false)?;
    session.set_field("content", "# Handbook")?;

    session.set_action("delete_chunk")?;
    session.set_field("chunk_id", "c7")?;
    assert!(!session.profile().is_active("chunk_method"));
    assert!(!session.normalized().fields.contains_key("chunk_method"));

    session.set_action("replace_document")?;
    let normalized = session.normalized();
    assert_eq!(normalized.get("chunk_method"), Some(&FieldValue::from("qa")));
    assert_eq!(normalized.get("parse"), Some(&FieldValue::Boolean(false)));
    assert_eq!(normalized.get("content"), Some(&FieldValue::from("# Handbook")));
    assert_eq!(session.buffer().get("chunk_id"), Some(&FieldValue::from("c7")));
    Ok(())
}

#[test]
fn clearing_a_field_restores_its_default() -> TestResult {
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;

    session.set_field("mime", "text/plain")?;
    assert_eq!(session.normalized().get("mime"), Some(&FieldValue::from("text/plain")));
    session.clear_field("mime")?;
    assert_eq!(session.normalized().get("mime"), Some(&FieldValue::from("text/markdown")));
    Ok(())
}

#[test]
fn malformed_inactive_field_does_not_block_validation() -> TestResult {
    let mut editor = TestEditor::new();
    editor.seed(vec![
        ("action", FieldValue::from("delete_document")),
        ("dataset", FieldValue::from("kb1")),
        ("parser_config", FieldValue::from("{not json")),
        ("enabled", FieldValue::from("sometimes")),
    ])?;
    let session = editor.open()?;

    let validated = session.validate().map_err(|e| e.to_string())?;
    assert_eq!(validated.values().len(), 1);
    Ok(())
}

#[test]
fn dataset_label_comes_from_catalog() -> TestResult {
    let catalog = Catalog::new(vec![KnowledgeBase {
        id: "50bf01".into(),
        name: "SalesKB".into(),
    }]);
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;

    assert_eq!(session.dataset_label(&catalog), None);
    session.set_field("dataset", "50bf01")?;
    assert_eq!(session.dataset_label(&catalog), Some("SalesKB"));
    session.set_field("dataset", "{begin@dataset}")?;
    assert_eq!(session.dataset_label(&catalog), None);
    assert!(session.validate().is_err());
    Ok(())
}

// ============================================================================
// Commit
// ============================================================================

#[test]
fn delete_chunk_commit_reports_missing_dataset_only() -> TestResult {
    let mut editor = TestEditor::new();
    editor.seed(vec![
        ("action", FieldValue::from("delete_chunk")),
        ("document_id", FieldValue::from("")),
        ("chunk_id", FieldValue::from("c1")),
    ])?;
    let mut session = editor.open()?;
    let before = session.snapshot();

    let err = session.commit().unwrap_err();
    let errors = err.validation().ok_or("expected validation errors")?;
    assert_eq!(errors.fields(), ["dataset"]);
    assert_eq!(errors.get("dataset"), Some(&FieldError::Required));
    assert!(!err.is_fatal());

    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.snapshot(), before);
    Ok(())
}

#[test]
fn successful_commit_hands_off_active_fields() -> TestResult {
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;
    session.set_field("dataset", "kb1")?;
    session.set_field("content", "Refunds take 5 business days.")?;
    session.set_field("important_keywords", "refund,billing")?;
    session.set_field("chunk_id", "left-over")?;

    let validated = session.commit()?;
    assert_eq!(session.state(), SessionState::Committed);
    assert_eq!(validated.action(), Action::AppendChunk);
    assert_eq!(validated.keywords(), ["refund", "billing"]);
    assert_eq!(validated.text("filename"), Some("update.md"));
    assert!(validated.get("chunk_id").is_none());
    Ok(())
}

#[test]
fn committed_session_rejects_further_edits() -> TestResult {
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;
    session.set_action("delete_document")?;
    session.set_field("dataset", "kb1")?;
    session.commit()?;

    assert!(matches!(
        session.set_field("dataset", "kb2"),
        Err(EngineError::AlreadyCommitted(_))
    ));
    assert!(matches!(session.commit(), Err(EngineError::AlreadyCommitted(_))));
    Ok(())
}

#[test]
fn failed_commit_can_be_corrected_and_retried() -> TestResult {
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;
    session.set_action("replace_document")?;
    session.set_field("dataset", "kb1")?;
    session.set_field("content", "body")?;
    session.set_field("parser_config", "[]")?;

    let err = session.commit().unwrap_err();
    let errors = err.validation().ok_or("expected validation errors")?;
    assert_eq!(errors.fields(), ["parser_config"]);

    session.set_field("parser_config", "{\"layout_recognize\": true}")?;
    let validated = session.commit()?;
    assert!(validated.parser_config().is_some());
    Ok(())
}

#[test]
fn variable_references_commit_for_formatted_fields() -> TestResult {
    let mut editor = TestEditor::new();
    let mut session = editor.open()?;
    session.set_action("replace_document")?;
    session.set_field("dataset", "{begin@dataset}")?;
    session.set_field("content", "body")?;
    session.set_field("chunk_method", "{begin@method}")?;
    session.set_field("parser_config", "{begin@cfg}")?;

    let validated = session.commit()?;
    assert_eq!(session.state(), SessionState::Committed);
    assert_eq!(validated.text("chunk_method"), Some("{begin@method}"));
    assert_eq!(validated.text("parser_config"), Some("{begin@cfg}"));
    Ok(())
}
