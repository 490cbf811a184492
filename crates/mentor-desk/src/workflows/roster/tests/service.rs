use super::common::*;
use crate::workflows::roster::domain::{ImportCandidate, RosterKind};
use crate::workflows::roster::outcome::{FailureCause, ImportFailure};
use crate::workflows::roster::parser::ParsedRoster;
use crate::workflows::roster::progress::{NoopObserver, RowStatus, RowStatusBoard};
use crate::workflows::roster::service::generate_credential_for_tests;
use crate::workflows::roster::RosterImportError;

fn teachers(emails: &[&str]) -> ParsedRoster {
    ParsedRoster {
        candidates: emails
            .iter()
            .map(|email| ImportCandidate::Teacher {
                email: email.to_string(),
            })
            .collect(),
        skipped: 0,
    }
}

#[tokio::test]
async fn teacher_file_imports_new_accounts_and_reports_notify_failures() {
    let (service, store, notifier) = build_service(
        MemoryStore::default(),
        ScriptedNotifier::failing_for(&["b@x.com"]),
    );

    let outcome = service
        .import_reader(RosterKind::Teacher, TEACHER_ROWS.as_bytes(), &NoopObserver)
        .await
        .expect("import succeeds");

    assert_eq!(outcome.imported_count, 2);
    assert_eq!(outcome.duplicate_count, 0);
    assert_eq!(outcome.notified_count, 1);
    assert_eq!(outcome.skipped_count, 1);
    assert_eq!(outcome.failures.len(), 1);

    let failure = &outcome.failures[0];
    assert_eq!(failure.email, "b@x.com");
    assert_eq!(failure.cause(), FailureCause::Notification);
    let password = failure.password.as_deref().expect("password kept for resend");
    assert_eq!(password.len(), 8);

    let stored = store.record("teachers", "b@x.com").expect("persisted");
    assert_eq!(stored.password, password);
    assert_eq!(notifier.sent().len(), 2);
}

#[tokio::test]
async fn teacher_accounts_carry_only_credentials() {
    let (service, store, _) = build_service(MemoryStore::default(), ScriptedNotifier::default());

    service
        .reconcile(RosterKind::Teacher, teachers(&["t@x.com"]), &NoopObserver)
        .await;

    let stored = store.record("teachers", "t@x.com").expect("persisted");
    assert_eq!(stored.email, "t@x.com");
    assert!(stored.name.is_none());
    assert!(stored.batch.is_none());
    assert!(stored.mentor_email.is_none());

    let json = serde_json::to_value(&stored).expect("serializes");
    let keys: Vec<&str> = json
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 3, "unexpected fields: {keys:?}");
}

#[tokio::test]
async fn student_accounts_default_optional_profile_fields() {
    let (service, store, _) = build_service(MemoryStore::default(), ScriptedNotifier::default());

    let outcome = service
        .import_reader(RosterKind::Student, STUDENT_ROWS.as_bytes(), &NoopObserver)
        .await
        .expect("import succeeds");

    assert_eq!(outcome.imported_count, 2);
    assert_eq!(outcome.notified_count, 2);
    assert_eq!(outcome.skipped_count, 1);
    assert!(store.record("students", "s2@x.com").is_none());

    let stored = store.record("students", "s1@x.com").expect("persisted");
    assert_eq!(stored.name.as_deref(), Some("Asha Rao"));
    assert_eq!(stored.phone_number.as_deref(), Some("9000000001"));
    assert_eq!(stored.roll_number.as_deref(), Some("101"));
    assert_eq!(stored.batch.as_deref(), Some(""));
    assert_eq!(stored.address.as_deref(), Some(""));
    assert_eq!(stored.parent_phone.as_deref(), Some(""));
    assert!(stored.mentor_email.is_none());
}

#[tokio::test]
async fn existing_accounts_are_never_overwritten() {
    let store = MemoryStore::default();
    let existing = existing_student("s1@x.com", "mentor@x.com");
    store.seed("students", existing.clone());
    let (service, store, notifier) = build_service(store, ScriptedNotifier::default());

    let outcome = service
        .import_reader(RosterKind::Student, STUDENT_ROWS.as_bytes(), &NoopObserver)
        .await
        .expect("import succeeds");

    assert_eq!(outcome.duplicate_count, 1);
    assert_eq!(outcome.imported_count, 1);
    assert_eq!(store.record("students", "s1@x.com"), Some(existing));
    assert!(notifier
        .sent()
        .iter()
        .all(|(email, _)| email != "s1@x.com"));
}

#[tokio::test]
async fn repeated_address_in_one_file_is_a_duplicate_of_the_first() {
    let (service, store, _) = build_service(MemoryStore::default(), ScriptedNotifier::default());

    let outcome = service
        .reconcile(
            RosterKind::Teacher,
            teachers(&["Dup@X.com", "dup@x.com"]),
            &NoopObserver,
        )
        .await;

    assert_eq!(outcome.imported_count, 1);
    assert_eq!(outcome.duplicate_count, 1);
    assert_eq!(store.len(), 1);
    assert!(store.record("teachers", "dup@x.com").is_some());
}

#[tokio::test]
async fn second_run_of_the_same_file_only_finds_duplicates() {
    let (service, store, notifier) =
        build_service(MemoryStore::default(), ScriptedNotifier::default());

    let first = service
        .import_reader(RosterKind::Student, STUDENT_ROWS.as_bytes(), &NoopObserver)
        .await
        .expect("first run");
    let snapshot = store.record("students", "s3@x.com");

    let second = service
        .import_reader(RosterKind::Student, STUDENT_ROWS.as_bytes(), &NoopObserver)
        .await
        .expect("second run");

    assert_eq!(first.imported_count, 2);
    assert_eq!(second.imported_count, 0);
    assert_eq!(second.duplicate_count, 2);
    assert_eq!(second.notified_count, 0);
    assert!(second.failures.is_empty());
    assert_eq!(store.record("students", "s3@x.com"), snapshot);
    assert_eq!(notifier.sent().len(), 2);
}

#[tokio::test]
async fn lookup_failure_is_isolated_to_its_candidate() {
    let (service, store, _) = build_service(
        MemoryStore::failing_lookup_for(&["b@x.com"]),
        ScriptedNotifier::default(),
    );

    let outcome = service
        .reconcile(
            RosterKind::Teacher,
            teachers(&["a@x.com", "b@x.com", "c@x.com"]),
            &NoopObserver,
        )
        .await;

    assert_eq!(outcome.imported_count, 2);
    assert_eq!(outcome.notified_count, 2);
    assert_eq!(outcome.failures.len(), 1);
    let failure = &outcome.failures[0];
    assert_eq!(failure.email, "b@x.com");
    assert_eq!(failure.cause(), FailureCause::Persistence);
    assert!(failure.password.is_none());
    assert!(failure
        .error
        .as_deref()
        .expect("error message")
        .contains("lookup timed out"));
    assert!(store.record("teachers", "c@x.com").is_some());
}

#[tokio::test]
async fn create_failure_is_not_counted_as_imported_or_notified() {
    let (service, store, notifier) = build_service(
        MemoryStore::failing_create_for(&["a@x.com"]),
        ScriptedNotifier::default(),
    );

    let outcome = service
        .reconcile(
            RosterKind::Teacher,
            teachers(&["a@x.com", "b@x.com"]),
            &NoopObserver,
        )
        .await;

    assert_eq!(outcome.imported_count, 1);
    assert_eq!(outcome.notified_count, 1);
    assert_eq!(
        outcome.failures,
        vec![ImportFailure::persistence(
            "a@x.com",
            "store unavailable: write rejected"
        )]
    );
    assert!(store.record("teachers", "a@x.com").is_none());
    assert_eq!(notifier.sent().len(), 1, "no credential sent for unsaved record");
}

#[tokio::test]
async fn observer_sees_final_row_states() {
    let store = MemoryStore::default();
    store.seed("students", existing_student("s1@x.com", "mentor@x.com"));
    let (service, _, _) = build_service(store, ScriptedNotifier::failing_for(&["s3@x.com"]));
    let board = RowStatusBoard::default();

    service
        .import_reader(RosterKind::Student, STUDENT_ROWS.as_bytes(), &board)
        .await
        .expect("import succeeds");

    let rows = board.snapshot();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows["s1@x.com"], RowStatus::Idle);
    assert_eq!(rows["s3@x.com"], RowStatus::Failed);
}

#[tokio::test]
async fn repeated_address_keeps_succeeded_row_status() {
    let (service, store, notifier) =
        build_service(MemoryStore::default(), ScriptedNotifier::failing_for(&[]));
    let board = RowStatusBoard::default();

    let outcome = service
        .import_reader(RosterKind::Teacher, "Dup@X.com\ndup@x.com\n".as_bytes(), &board)
        .await
        .expect("import succeeds");

    assert_eq!(outcome.imported_count, 1);
    assert_eq!(outcome.duplicate_count, 1);
    assert_eq!(store.len(), 1);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(board.status("dup@x.com"), RowStatus::Succeeded);
}

#[tokio::test]
async fn parse_failure_aborts_before_any_store_access() {
    let (service, store, notifier) =
        build_service(MemoryStore::default(), ScriptedNotifier::default());

    let error = service
        .import_reader(
            RosterKind::Student,
            "email,name\na@x.com,Ada\n".as_bytes(),
            &NoopObserver,
        )
        .await
        .expect_err("missing columns");

    assert!(matches!(error, RosterImportError::MissingColumns { .. }));
    assert_eq!(store.len(), 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn credential_length_is_configurable() {
    let store = std::sync::Arc::new(MemoryStore::default());
    let notifier = std::sync::Arc::new(ScriptedNotifier::failing_for(&["a@x.com"]));
    let service =
        crate::workflows::roster::RosterImportService::new(store.clone(), notifier.clone())
            .with_credential_length(12);

    let outcome = service
        .reconcile(RosterKind::Teacher, teachers(&["a@x.com"]), &NoopObserver)
        .await;

    let password = outcome.failures[0].password.as_deref().expect("password");
    assert_eq!(password.len(), 12);
}

#[test]
fn generated_credentials_are_alphanumeric_and_distinct() {
    let first = generate_credential_for_tests(8);
    let second = generate_credential_for_tests(8);

    assert_eq!(first.len(), 8);
    assert!(first.chars().all(|ch| ch.is_ascii_alphanumeric()));
    assert_ne!(first, second);
}
