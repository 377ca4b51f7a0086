//! # sessionlens-core
//!
//! Reconstructs a coding-assistant session from its hook log and transcript.
//!
//! ## Key Types
//!
//! - [`ReportAssembler`] - Entry point: logs in, [`SessionReport`] out
//! - [`SuccessClassifier`] - Ordered heuristics deciding success or failure
//! - [`TimelineEntry`] - One renderable event of a session
//! - [`ReportStore`] - Saved reports on disk

pub mod classifier;
mod config;
mod error;
pub mod payload;
pub mod report;
pub mod store;
pub mod timeline;
pub mod types;

pub use classifier::{ClassifierConfig, Rule, RuleOutcome, SuccessClassifier, Verdict};
pub use config::PipelineConfig;
pub use error::ReportError;
pub use report::{ReportAssembler, ReportRequest};
pub use store::{ReportStore, ReportSummary};
pub use timeline::build_timeline;
pub use types::{
    EntryKind, ReportMetadata, SessionReport, TaskDetails, TimelineEntry, TodoItem, TodoStatus,
    ToolDetails,
};
