use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::IngestError;
use crate::types::{CaptureRecord, HookLogEntry, TranscriptEntry};

/// Parse the hook lifecycle log at `path`.
pub fn parse_log_file(path: &Path) -> Result<Vec<HookLogEntry>, IngestError> {
    parse_jsonl(path)
}

/// Parse the conversation transcript at `path`.
pub fn parse_transcript_file(path: &Path) -> Result<Vec<TranscriptEntry>, IngestError> {
    parse_jsonl(path)
}

/// Parse a terminal capture log at `path`.
pub fn parse_capture_file(path: &Path) -> Result<Vec<CaptureRecord>, IngestError> {
    parse_jsonl(path)
}

/// Return the first `transcript_path` exposed by any entry, in log order.
pub fn find_transcript_path(entries: &[HookLogEntry]) -> Option<String> {
    entries
        .iter()
        .find_map(|e| e.data.transcript_path.clone())
}

/// Parse JSONL records from any reader. Blank and malformed lines are skipped;
/// the last line of an append-only log is routinely half-written, possibly in
/// the middle of a multi-byte character. Only read failures are errors.
pub fn parse_lines<T, R>(reader: R) -> std::io::Result<Vec<T>>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                trace!(line = index + 1, error = %e, "Skipping malformed line");
            }
        }
    }

    if skipped > 0 {
        debug!(parsed = records.len(), skipped, "Dropped unparsable lines");
    }

    Ok(records)
}

fn parse_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IngestError> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let records = parse_lines(BufReader::new(file)).map_err(io_err)?;
    debug!(path = %path.display(), records = records.len(), "Parsed log file");
    Ok(records)
}
