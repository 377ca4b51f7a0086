//! # sessionlens-ingest
//!
//! Typed records for the three line-delimited JSON logs a wrapped assistant
//! session leaves behind: the hook lifecycle log, the conversation transcript
//! and the terminal capture log.
//!
//! Parsing favours availability: a line that does not parse is dropped, and
//! only a missing or unreadable file is an error.

mod error;
pub mod parser;
pub mod types;

pub use error::IngestError;
pub use parser::{
    find_transcript_path, parse_capture_file, parse_lines, parse_log_file, parse_transcript_file,
};
pub use types::{
    CaptureRecord, ContentBlock, HookData, HookLogEntry, MessageContent, TranscriptEntry,
    TranscriptMessage, TranscriptRole, Usage, POST_TOOL_USE, PRE_TOOL_USE,
};
