use serde::{Deserialize, Serialize};

/// Status of a transcript through its lifecycle.
///
/// Owned by the transcript service. Progresses
/// `Pending -> Processing -> {Completed | Failed}` and never moves backwards.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    /// Transcription has been requested but not started
    #[default]
    Pending,
    /// Audio is being downloaded or transcribed
    Processing,
    /// Transcript text is available and editable
    Completed,
    /// Transcription failed
    Failed,
}

impl TranscriptStatus {
    /// `Completed` and `Failed` never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TranscriptStatus::Completed | TranscriptStatus::Failed)
    }

    /// Only completed transcripts carry text that may be edited.
    pub fn is_editable(&self) -> bool {
        *self == TranscriptStatus::Completed
    }
}

impl std::fmt::Display for TranscriptStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptStatus::Pending => write!(fmt, "pending"),
            TranscriptStatus::Processing => write!(fmt, "processing"),
            TranscriptStatus::Completed => write!(fmt, "completed"),
            TranscriptStatus::Failed => write!(fmt, "failed"),
        }
    }
}
