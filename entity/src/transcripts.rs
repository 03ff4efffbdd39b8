//! Transcript records as served by the transcript service.

use crate::language::Language;
use crate::transcript_status::TranscriptStatus;
use crate::{timestamp, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,

    /// Source video, fixed at creation
    pub youtube_url: String,

    /// Spoken language requested at creation (default: en)
    #[serde(default)]
    pub language: Language,

    /// Current status of the transcription, owned by the service
    #[serde(default)]
    pub status: TranscriptStatus,

    /// Full transcript text, only meaningful once completed
    #[serde(default)]
    pub transcript_text: Option<String>,

    /// File name of the stored audio, `None` when the service kept no audio
    #[serde(default)]
    pub audio_file: Option<String>,

    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Whether the transcript text may be edited from the client.
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// Case-insensitive substring match on the source URL.
    /// An empty query matches every record.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.youtube_url.to_lowercase().contains(&query)
    }
}

/// Response to a transcription request.
///
/// The reference service transcribes synchronously and answers with the
/// finished text but no status. A service that queues the work instead
/// answers with a `pending`/`processing` status and no text yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Id,

    #[serde(default)]
    pub status: Option<TranscriptStatus>,

    /// Transcript text, used as the preview after submission
    #[serde(default)]
    pub transcript: Option<String>,

    #[serde(default)]
    pub audio_file: Option<String>,
}

impl Submission {
    /// Status of the new record. Without an explicit status the presence of
    /// text means the service already finished.
    pub fn effective_status(&self) -> TranscriptStatus {
        match self.status {
            Some(status) => status,
            None if self.transcript.is_some() => TranscriptStatus::Completed,
            None => TranscriptStatus::Pending,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.effective_status().is_terminal()
    }
}
