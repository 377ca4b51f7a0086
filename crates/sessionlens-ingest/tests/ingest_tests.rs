use std::fs;

use sessionlens_ingest::{
    find_transcript_path, parse_capture_file, parse_log_file, parse_transcript_file, IngestError,
    TranscriptRole,
};
use tempfile::TempDir;

/// Helper: write a hook log and a transcript into a temp directory.
fn create_test_logs_dir() -> TempDir {
    let dir = TempDir::new().unwrap();

    let hook_log = r#"{"timestamp":"2026-01-20T10:00:00.000Z","type":"hook","sessionId":"abc-123","data":{"hook_event_name":"SessionStart","transcript_path":"/home/user/.claude/projects/p/abc-123.jsonl"}}
{"timestamp":"2026-01-20T10:00:01.000Z","type":"hook","sessionId":"abc-123","data":{"hook_event_name":"PreToolUse","tool_name":"Bash","tool_input":{"command":"cargo test"}}}
{"timestamp":"2026-01-20T10:00:03.000Z","type":"hook","sessionId":"abc-123","data":{"hook_event_name":"PostToolUse","tool_name":"Bash","tool_input":{"command":"cargo test"},"tool_response":{"stdout":"ok"}}}
{"timestamp":"2026-01-20T10:00:04.000Z","type":"hook","sessionId":"abc-123","data":{"hook_event_name":"Stop"}}
{"timestamp":"2026-01-20T10:00:05.000Z","type":"hook","sess"#;
    fs::write(dir.path().join("hooks.jsonl"), hook_log).unwrap();

    let transcript = r#"{"type":"user","timestamp":"2026-01-20T10:00:00.500Z","uuid":"u1","message":{"role":"user","content":"run the tests"}}
{"type":"assistant","timestamp":"2026-01-20T10:00:00.800Z","uuid":"a1","message":{"role":"assistant","content":[{"type":"text","text":"Running the test suite."}],"usage":{"input_tokens":120,"output_tokens":30}}}
{"type":"user","timestamp":"2026-01-20T10:00:03.100Z","uuid":"u2","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"t1","content":"ok"}]},"toolUseResult":{"stdout":"ok"}}
{"type":"system","timestamp":"2026-01-20T10:00:03.200Z","message":{"content":"compacted"}}
garbage"#;
    fs::write(dir.path().join("transcript.jsonl"), transcript).unwrap();

    dir
}

// ============================================================
// Hook log tests
// ============================================================

#[test]
fn test_parse_log_file_drops_partial_tail() {
    let dir = create_test_logs_dir();

    let entries = parse_log_file(&dir.path().join("hooks.jsonl")).unwrap();

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].session_id, "abc-123");
    assert_eq!(entries[0].kind, "hook");
    assert!(entries[1].is_pre_tool_use());
    assert!(entries[2].is_post_tool_use());
    assert_eq!(entries[2].tool_name(), Some("Bash"));
    assert_eq!(entries[3].event_name(), Some("Stop"));
}

#[test]
fn test_parse_log_file_preserves_order() {
    let dir = create_test_logs_dir();

    let entries = parse_log_file(&dir.path().join("hooks.jsonl")).unwrap();

    let timestamps: Vec<_> = entries.iter().map(|e| e.timestamp).collect();
    let mut sorted = timestamps.clone();
    sorted.sort();
    assert_eq!(timestamps, sorted);
}

#[test]
fn test_parse_log_file_drops_tail_cut_mid_character() {
    let dir = create_test_logs_dir();
    let path = dir.path().join("hooks.jsonl");
    let valid = fs::read_to_string(&path).unwrap();
    let mut content: Vec<u8> = valid
        .lines()
        .take(3)
        .flat_map(|line| format!("{}\n", line).into_bytes())
        .collect();
    content.extend_from_slice(
        b"{\"timestamp\":\"2026-01-20T10:00:04.000Z\",\"type\":\"hook\",\"data\":{\"hook_event_name\":\"St\xC3",
    );
    fs::write(&path, content).unwrap();

    let entries = parse_log_file(&path).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].tool_name(), Some("Bash"));
    assert!(entries[2].is_post_tool_use());
}

#[test]
fn test_parse_log_file_missing_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.jsonl");

    let err = parse_log_file(&path).unwrap_err();

    assert!(matches!(err, IngestError::Io { .. }));
    assert_eq!(err.path(), &path);
    assert!(err.to_string().contains("missing.jsonl"));
}

#[test]
fn test_find_transcript_path_from_log() {
    let dir = create_test_logs_dir();

    let entries = parse_log_file(&dir.path().join("hooks.jsonl")).unwrap();

    assert_eq!(
        find_transcript_path(&entries).as_deref(),
        Some("/home/user/.claude/projects/p/abc-123.jsonl")
    );
}

// ============================================================
// Transcript tests
// ============================================================

#[test]
fn test_parse_transcript_file_roles() {
    let dir = create_test_logs_dir();

    let entries = parse_transcript_file(&dir.path().join("transcript.jsonl")).unwrap();

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].role, TranscriptRole::User);
    assert_eq!(entries[0].string_content(), Some("run the tests"));
    assert_eq!(entries[1].role, TranscriptRole::Assistant);
    assert_eq!(entries[1].text_blocks(), vec!["Running the test suite."]);
    assert_eq!(entries[1].usage().map(|u| u.total()), Some(150));
    assert_eq!(entries[2].string_content(), None);
    assert!(entries[2].tool_use_result.is_some());
    assert_eq!(entries[3].role, TranscriptRole::System);
}

#[test]
fn test_parse_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.jsonl");
    fs::write(&path, "").unwrap();

    assert!(parse_transcript_file(&path).unwrap().is_empty());
}

// ============================================================
// Capture log tests
// ============================================================

#[test]
fn test_parse_capture_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.jsonl");
    let capture = r#"{"chunkNumber":1,"length":12,"escapeSequences":["\u001b[2K"],"containsClearLine":true,"containsMoveUp":false,"visibleText":"hello world"}
{"chunkNumber":2,"length":5,"escapeSequences":0,"containsClearLine":false,"containsMoveUp":true,"visibleText":"x","data":"\u001b[1Ax","timestamp":"2026-01-20T10:00:00Z"}"#;
    fs::write(&path, capture).unwrap();

    let records = parse_capture_file(&path).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].chunk_number, 1);
    assert!(records[0].contains_clear_line);
    assert_eq!(records[0].chunk_text(), "hello world");
    assert!(records[1].contains_move_up);
    assert_eq!(records[1].chunk_text(), "\u{1b}[1Ax");
    assert!(records[1].timestamp.is_some());
}

#[test]
fn test_capture_chunk_text_restores_redraw_without_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.jsonl");
    let capture = r#"{"chunkNumber":1,"containsClearLine":true,"containsMoveUp":true,"visibleText":"Working"}
{"chunkNumber":2,"containsClearLine":true,"containsMoveUp":false,"visibleText":"Done"}"#;
    fs::write(&path, capture).unwrap();

    let records = parse_capture_file(&path).unwrap();

    assert!(records[0].is_redraw());
    assert_eq!(records[0].chunk_text(), "\u{1b}[2K\u{1b}[1AWorking");
    assert!(!records[1].is_redraw());
    assert_eq!(records[1].chunk_text(), "Done");
}
