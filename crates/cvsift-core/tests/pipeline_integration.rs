//! Integration tests for the sequential extraction pipeline.
//!
//! These tests drive [`extract_folder`] over real temp files with a scripted
//! [`MockChat`] backend, so no HTTP requests are made.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cvsift_core::mock::{MockChat, MockReply};
use cvsift_core::{Config, CvRecord, ProgressEvent, extract_folder};
use tokio_util::sync::CancellationToken;

fn reply(name: &str, email: &str) -> MockReply {
    MockReply::Content(format!(
        r#"{{"name": "{name}", "email": "{email}", "years_experience": 5}}"#
    ))
}

fn write_cvs(dir: &tempfile::TempDir, names: &[(&str, &str)]) -> Vec<PathBuf> {
    for (file, body) in names {
        fs::write(dir.path().join(file), body).unwrap();
    }
    cvsift_ingest::collect_cv_files(dir.path()).unwrap()
}

#[tokio::test]
async fn one_row_per_file_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_cvs(
        &dir,
        &[
            ("alice.txt", "Alice CV text"),
            ("bob.txt", "Bob CV text"),
            ("carol.txt", "Carol CV text"),
        ],
    );

    let backend = MockChat::with_sequence(vec![
        reply("Alice", "alice@example.com"),
        reply("Bob", "bob@example.com"),
        reply("Carol", "carol@example.com"),
    ]);
    let config = Config::default();

    let (records, stats) =
        extract_folder(&files, &config, &backend, |_| {}, CancellationToken::new()).await;

    assert_eq!(records.len(), 3);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.succeeded, 3);
    assert_eq!(backend.call_count(), 3);

    let filenames: Vec<_> = records.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(filenames, vec!["alice.txt", "bob.txt", "carol.txt"]);
    assert_eq!(records[0].name.as_deref(), Some("Alice"));
    assert_eq!(records[2].email.as_deref(), Some("carol@example.com"));
    assert_eq!(records[1].years_experience.as_deref(), Some("5"));
}

#[tokio::test]
async fn api_failure_yields_null_filled_row_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_cvs(&dir, &[("a.txt", "A"), ("b.txt", "B"), ("c.txt", "C")]);

    let backend = MockChat::with_sequence(vec![
        reply("A", "a@example.com"),
        MockReply::ApiError {
            status: 500,
            message: "server exploded".into(),
        },
        reply("C", "c@example.com"),
    ]);
    let config = Config::default();

    let (records, stats) =
        extract_folder(&files, &config, &backend, |_| {}, CancellationToken::new()).await;

    assert_eq!(records.len(), 3);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed_api, 1);
    assert_eq!(records[1], CvRecord::empty("b.txt"));
    assert_eq!(records[2].name.as_deref(), Some("C"));
}

#[tokio::test]
async fn malformed_reply_yields_null_filled_row() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_cvs(&dir, &[("a.txt", "A")]);

    let backend = MockChat::new(MockReply::Content("sorry, no JSON here".into()));
    let config = Config::default();

    let (records, stats) =
        extract_folder(&files, &config, &backend, |_| {}, CancellationToken::new()).await;

    assert_eq!(records, vec![CvRecord::empty("a.txt")]);
    assert_eq!(stats.failed_api, 1);
}

#[tokio::test]
async fn unreadable_file_skips_api_call() {
    let dir = tempfile::tempdir().unwrap();
    // A .docx that is not a ZIP archive fails text extraction.
    let files = write_cvs(&dir, &[("broken.docx", "not a zip"), ("ok.txt", "fine")]);

    let backend = MockChat::new(reply("Jane", "jane@example.com"));
    let config = Config::default();

    let (records, stats) =
        extract_folder(&files, &config, &backend, |_| {}, CancellationToken::new()).await;

    assert_eq!(records.len(), 2);
    assert_eq!(stats.failed_extraction, 1);
    assert_eq!(records[0], CvRecord::empty("broken.docx"));
    assert_eq!(records[1].name.as_deref(), Some("Jane"));
    // The broken file never reached the backend.
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn oversized_text_is_truncated_before_sending() {
    let dir = tempfile::tempdir().unwrap();
    let body = "x".repeat(10_000);
    let files = write_cvs(&dir, &[("big.txt", body.as_str())]);

    let backend = MockChat::new(reply("Jane", "jane@example.com"));
    let config = Config {
        max_text_chars: 4000,
        ..Config::default()
    };

    let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let (_, stats) = extract_folder(
        &files,
        &config,
        &backend,
        move |e| sink.lock().unwrap().push(e),
        CancellationToken::new(),
    )
    .await;
    assert_eq!(stats.succeeded, 1);

    let calls = backend.recorded_calls();
    let (_, user) = &calls[0];
    let cv_body = user.split("CV Content:\n").nth(1).unwrap();
    assert_eq!(cv_body.chars().count(), 4000);

    let truncated_event = events.lock().unwrap().iter().any(|e| {
        matches!(
            e,
            ProgressEvent::Extracted {
                truncated: true,
                chars: 10_000,
                ..
            }
        )
    });
    assert!(truncated_event);
}

#[tokio::test]
async fn cancelled_run_keeps_completed_records() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_cvs(&dir, &[("a.txt", "A"), ("b.txt", "B")]);

    let backend = MockChat::new(reply("Jane", "jane@example.com"));
    let config = Config::default();
    let cancel = CancellationToken::new();

    // Cancel after the first file completes.
    let cancel_after_first = cancel.clone();
    let (records, _) = extract_folder(
        &files,
        &config,
        &backend,
        move |e| {
            if matches!(e, ProgressEvent::Succeeded { index: 0, .. }) {
                cancel_after_first.cancel();
            }
        },
        cancel,
    )
    .await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].filename, "a.txt");
}

#[tokio::test]
async fn rerun_with_same_replies_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_cvs(&dir, &[("a.txt", "A"), ("b.txt", "B")]);
    let config = Config::default();

    let run = || async {
        let backend = MockChat::with_sequence(vec![
            reply("A", "a@example.com"),
            MockReply::RateLimited,
        ]);
        extract_folder(&files, &config, &backend, |_| {}, CancellationToken::new())
            .await
            .0
    };

    assert_eq!(run().await, run().await);
}
