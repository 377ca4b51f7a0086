//! # sessionlens-filters
//!
//! Noise filters for captured terminal output.
//!
//! ## Key Types
//!
//! - [`TextSimilarityFilter`] - Drops lines that repeat recently kept lines
//! - [`AnimationFrameDetector`] - Drops spinner and status-panel redraws
//!
//! Both are plain stateful values. Give each capture session its own
//! instance and call `reset()` between sessions.

pub mod animation;
pub mod ansi;
pub mod capture;
pub mod similarity;

pub use animation::{AnimationConfig, AnimationFrameDetector, FrameKind, RawChunk};
pub use ansi::{strip_ansi, strip_terminal_control};
pub use capture::filter_capture;
pub use similarity::{similarity, SimilarityConfig, TextSimilarityFilter};
