//! File-based CSV loader tests for `airsync-loader`.
//!
//! Each case writes its fixture into an isolated `TempDir`.

use std::fs;
use std::path::PathBuf;

use airsync_core::{FieldMapping, RecordError};
use airsync_loader::{load_csv, ErrorKind, LoadError};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn fixture(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("people.csv");
    fs::write(&path, content).expect("write fixture");
    (dir, path)
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[test]
fn loads_sample_file() {
    let (_dir, path) = fixture(
        "email,first_name,last_name,updated_at\n\
         ana@example.com,Ana,Lima,2024-01-05T10:00:00Z\n\
         bob@example.com,Bob,Stone,2024-01-03T10:00:00Z\n\
         dora@example.com,Dora,Reis,2024-01-01T00:00:00Z\n",
    );

    let set = load_csv(&path, &FieldMapping::default()).expect("load");

    let ids: Vec<&str> = set.identifiers().map(|id| id.as_str()).collect();
    assert_eq!(ids, ["ana@example.com", "bob@example.com", "dora@example.com"]);
}

#[test]
fn crlf_line_endings_are_accepted() {
    let (_dir, path) = fixture("email,updated_at\r\nana@example.com,2024-01-05\r\n");
    let set = load_csv(&path, &FieldMapping::default()).expect("load");
    assert!(set.contains("ana@example.com"));
}

#[test]
fn custom_field_mapping_is_honored() {
    let (_dir, path) = fixture("Email Address,Modified\nana@example.com,2024-01-05 08:30:00\n");
    let fields = FieldMapping {
        identifier: "Email Address".to_string(),
        timestamp: "Modified".to_string(),
        passthrough: vec![],
    };

    let set = load_csv(&path, &fields).expect("load");
    let ana = set.get("ana@example.com").expect("ana");
    assert_eq!(ana.updated_at.to_rfc3339(), "2024-01-05T08:30:00+00:00");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = load_csv(&dir.path().join("absent.csv"), &FieldMapping::default()).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "got: {err}");
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[rstest]
#[case("first_name,updated_at\nAna,2024-01-01\n", "email")]
#[case("email,first_name\nana@example.com,Ana\n", "updated_at")]
#[case("", "email")]
fn missing_required_column(#[case] content: &str, #[case] column: &str) {
    let (_dir, path) = fixture(content);
    let err = load_csv(&path, &FieldMapping::default()).unwrap_err();
    match err {
        LoadError::MissingColumn { column: got, .. } => assert_eq!(got, column),
        other => panic!("expected missing column, got {other:?}"),
    }
}

#[rstest]
#[case("not-a-date")]
#[case("2024-13-01")]
#[case("")]
fn unparseable_timestamp_aborts(#[case] ts: &str) {
    let (_dir, path) = fixture(&format!("email,updated_at\nana@example.com,{ts}\n"));
    let err = load_csv(&path, &FieldMapping::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(
        matches!(
            err,
            LoadError::Record {
                source: RecordError::InvalidTimestamp { .. } | RecordError::MissingTimestamp,
                ..
            }
        ),
        "got: {err}"
    );
}

#[test]
fn error_message_names_file_and_row() {
    let (_dir, path) = fixture(
        "email,updated_at\n\
         ana@example.com,2024-01-01\n\
         ana@example.com,2024-01-02\n",
    );
    let msg = load_csv(&path, &FieldMapping::default())
        .unwrap_err()
        .to_string();
    assert!(msg.contains("people.csv"), "got: {msg}");
    assert!(msg.contains("row 2 (line 3)"), "got: {msg}");
    assert!(msg.contains("duplicate identifier 'ana@example.com'"), "got: {msg}");
}
