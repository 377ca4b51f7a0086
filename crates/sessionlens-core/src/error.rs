use std::path::PathBuf;

use thiserror::Error;

use sessionlens_ingest::IngestError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("No transcript_path found in hook log {}", hook_log.display())]
    TranscriptNotFound { hook_log: PathBuf },
}
