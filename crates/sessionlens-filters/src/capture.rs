use chrono::{DateTime, Utc};
use tracing::debug;

use sessionlens_ingest::CaptureRecord;

use crate::animation::{AnimationFrameDetector, RawChunk};
use crate::similarity::TextSimilarityFilter;

/// Run capture records through the animation detector and then the similarity
/// filter, returning the surviving text.
///
/// Records without a timestamp are treated as arriving at `fallback_time`.
/// Untimed records therefore all arrive together, so after the first chunk
/// every animation frame among them falls inside the rate gate and is dropped;
/// content chunks are unaffected. Records without raw `data` are classified
/// from their visible text plus the redraw flags (see
/// [`CaptureRecord::chunk_text`]).
///
/// Both filters are reset first so no state leaks in from a previous session.
pub fn filter_capture(
    records: &[CaptureRecord],
    detector: &mut AnimationFrameDetector,
    similarity: &mut TextSimilarityFilter,
    fallback_time: DateTime<Utc>,
) -> String {
    detector.reset();
    similarity.reset();

    let mut kept = Vec::new();
    for record in records {
        let chunk = RawChunk::new(
            record.chunk_text(),
            record.timestamp.unwrap_or(fallback_time),
        );
        let content = detector.process(&chunk);
        if content.is_empty() {
            continue;
        }

        let filtered = similarity.filter(&content);
        if !filtered.trim().is_empty() {
            kept.push(filtered);
        }
    }

    debug!(records = records.len(), kept = kept.len(), "Filtered capture log");
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(n: u64, data: &str, ms: i64) -> CaptureRecord {
        let base = Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap();
        CaptureRecord {
            chunk_number: n,
            length: data.len(),
            escape_sequences: serde_json::Value::Null,
            contains_clear_line: data.contains("\x1b[2K"),
            contains_move_up: data.contains("\x1b[1A"),
            visible_text: String::new(),
            timestamp: Some(base + Duration::milliseconds(ms)),
            data: Some(data.to_string()),
        }
    }

    #[test]
    fn test_spinner_redraws_collapse() {
        let records = vec![
            record(1, "Starting build of the project", 0),
            record(2, "\x1b[2K\x1b[1A✻ Building… (1s)", 40),
            record(3, "\x1b[2K\x1b[1A✻ Building… (1s)", 80),
            record(4, "\x1b[2K\x1b[1A✻ Building… (2s)", 120),
            record(5, "Build finished in 2.4 seconds", 600),
            record(6, "Build finished in 2.5 seconds", 700),
        ];

        let mut detector = AnimationFrameDetector::default();
        let mut similarity = TextSimilarityFilter::default();
        let out = filter_capture(&records, &mut detector, &mut similarity, Utc::now());

        assert_eq!(
            out,
            "Starting build of the project\nBuild finished in 2.4 seconds"
        );
    }

    fn visible(n: u64, text: &str, redraw: bool) -> CaptureRecord {
        CaptureRecord {
            chunk_number: n,
            length: text.len(),
            escape_sequences: serde_json::Value::Null,
            contains_clear_line: redraw,
            contains_move_up: redraw,
            visible_text: text.to_string(),
            timestamp: None,
            data: None,
        }
    }

    #[test]
    fn test_visible_text_records_use_redraw_flags() {
        let records = vec![
            visible(1, "Compiling greet v0.1.0", false),
            visible(2, "Scanning workspace for manifests", true),
            visible(3, "Scanning workspace for manifests again", true),
            visible(4, "Finished dev profile in 3.2s", false),
        ];

        let mut detector = AnimationFrameDetector::default();
        let mut similarity = TextSimilarityFilter::default();
        let out = filter_capture(&records, &mut detector, &mut similarity, Utc::now());

        assert_eq!(out, "Compiling greet v0.1.0\nFinished dev profile in 3.2s");
    }

    #[test]
    fn test_fresh_instances_are_idempotent() {
        let records = vec![
            record(1, "Reading configuration file", 0),
            record(2, "\x1b[2K\x1b[1AStill reading", 30),
            record(3, "Reading configuration file", 500),
            record(4, "Wrote 3 files to disk", 900),
        ];

        let run = || {
            let mut detector = AnimationFrameDetector::default();
            let mut similarity = TextSimilarityFilter::default();
            filter_capture(&records, &mut detector, &mut similarity, Utc::now())
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_reused_instances_are_reset() {
        let records = vec![record(1, "Welcome back to the session", 0)];
        let mut detector = AnimationFrameDetector::default();
        let mut similarity = TextSimilarityFilter::default();

        let first = filter_capture(&records, &mut detector, &mut similarity, Utc::now());
        let second = filter_capture(&records, &mut detector, &mut similarity, Utc::now());

        assert_eq!(first, "Welcome back to the session");
        assert_eq!(second, first);
    }
}
