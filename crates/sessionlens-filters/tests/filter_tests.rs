use chrono::{DateTime, Duration, TimeZone, Utc};

use sessionlens_filters::{
    similarity, AnimationConfig, AnimationFrameDetector, FrameKind, RawChunk, SimilarityConfig,
    TextSimilarityFilter,
};

fn at(ms: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap() + Duration::milliseconds(ms)
}

// ============================================================
// Animation detection
// ============================================================

#[test]
fn test_status_panel_redraw_is_animation() {
    let detector = AnimationFrameDetector::default();
    let chunk = "\x1b[2K\x1b[1A╭─ ✻ Working (esc to interrupt) 12 tokens ─╮";

    assert_eq!(detector.classify(chunk), FrameKind::Animation);
}

#[test]
fn test_boxed_chrome_without_cursor_moves_is_animation() {
    let detector = AnimationFrameDetector::default();
    let chunk = "\x1b[2m│ ↓ 1.2k tokens · esc to interrupt │\x1b[0m";

    assert_eq!(detector.classify(chunk), FrameKind::Animation);
}

#[test]
fn test_plain_output_is_content() {
    let detector = AnimationFrameDetector::default();

    assert_eq!(
        detector.classify("error[E0308]: mismatched types"),
        FrameKind::Content
    );
}

#[test]
fn test_slow_animation_frame_is_kept() {
    let mut detector = AnimationFrameDetector::default();

    detector.process(&RawChunk::new("Compiling sessionlens", at(0)));
    let out = detector.process(&RawChunk::new("\x1b[2K\x1b[1AChecking workspace", at(500)));

    assert_eq!(out, "Checking workspace");
}

#[test]
fn test_rate_gate_is_configurable() {
    let mut detector = AnimationFrameDetector::new(AnimationConfig {
        rate_gate_ms: 1000,
        ..AnimationConfig::default()
    });

    detector.process(&RawChunk::new("Compiling sessionlens", at(0)));
    let out = detector.process(&RawChunk::new("\x1b[2K\x1b[1AChecking workspace", at(500)));

    assert!(out.is_empty());
}

#[test]
fn test_flush_drains_buffer() {
    let mut detector = AnimationFrameDetector::default();

    detector.process(&RawChunk::new("first line\n\nsecond line", at(0)));
    detector.process(&RawChunk::new("\x1b[2K\x1b[1A✻ Thinking… (1s)", at(10)));
    detector.process(&RawChunk::new("third line", at(400)));

    assert_eq!(detector.flush(), "first line\nsecond line\nthird line");
    assert_eq!(detector.flush(), "");
}

// ============================================================
// Similarity filtering
// ============================================================

#[test]
fn test_progress_tick_is_dropped() {
    let mut filter = TextSimilarityFilter::default();

    assert_eq!(
        filter.accept_line("Building... (3s)").as_deref(),
        Some("Building... (3s)")
    );
    assert_eq!(filter.accept_line("Building... (4s)"), None);
}

#[test]
fn test_score_at_threshold_is_duplicate() {
    let score = similarity("Building... (3s)", "Building... (4s)");
    let mut filter = TextSimilarityFilter::new(SimilarityConfig {
        threshold: score,
        ..SimilarityConfig::default()
    });

    filter.accept_line("Building... (3s)");

    assert_eq!(filter.accept_line("Building... (4s)"), None);
}

#[test]
fn test_window_forgets_old_lines() {
    let mut filter = TextSimilarityFilter::new(SimilarityConfig {
        window_size: 2,
        ..SimilarityConfig::default()
    });

    let out = filter.filter(
        "alpha release notes\nbravo compile step\ncharlie deploy target\nalpha release notes",
    );

    assert_eq!(
        out,
        "alpha release notes\nbravo compile step\ncharlie deploy target\nalpha release notes"
    );
}

#[test]
fn test_short_fragments_dropped_blank_lines_kept() {
    let mut filter = TextSimilarityFilter::default();

    let out = filter.filter("Summary of changes\nok\n\nAll tests passed");

    assert_eq!(out, "Summary of changes\n\nAll tests passed");
}

#[test]
fn test_ansi_removed_before_comparison() {
    let mut filter = TextSimilarityFilter::default();

    let out = filter.filter("\x1b[32mTests passed: 12\x1b[0m\nTests passed: 12");

    assert_eq!(out, "Tests passed: 12");
}

#[test]
fn test_independent_instances_do_not_share_state() {
    let mut a = TextSimilarityFilter::default();
    let mut b = TextSimilarityFilter::default();

    a.accept_line("Running migrations");

    assert!(b.accept_line("Running migrations").is_some());
}

#[test]
fn test_reset_clears_window() {
    let mut filter = TextSimilarityFilter::default();
    filter.accept_line("Running migrations");

    filter.reset();

    assert!(filter.accept_line("Running migrations").is_some());
}
