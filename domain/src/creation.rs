//! Transcription requests.
//!
//! The reference service transcribes synchronously and answers with the finished text.
//! A service that queues the work answers with a provisional status instead; such a
//! submission can be followed up by polling until it settles.

use crate::error::{DomainErrorKind, Error, ValidationErrorKind};
use crate::gateway::TranscriptGateway;
use crate::generation::RequestGeneration;
use entity::{language::Language, transcript_status::TranscriptStatus, transcripts};
use events::{ClientEvent, EventPublisher, RefreshReason};
use log::*;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const GENERIC_FAILURE: &str = "Failed to transcribe.";
const EMPTY_URL: &str = "Please enter a YouTube URL.";
const GENERATED: &str = "Transcript generated successfully.";
const QUEUED: &str = "Transcription started.";
const FAILED: &str = "Transcription failed.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CreationPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreationState {
    pub phase: CreationPhase,
    pub url: String,
    pub language: Language,
    /// Transcript text of the latest successful submission.
    pub preview: Option<String>,
    /// Banner for the latest attempt.
    pub message: Option<String>,
    pub last_error: Option<DomainErrorKind>,
    pub submission: Option<transcripts::Submission>,
    generation: RequestGeneration,
}

impl CreationState {
    fn clear_banners(&mut self) {
        self.message = None;
        self.preview = None;
        self.last_error = None;
    }

    /// Editing a field dismisses a settled outcome.
    fn field_edited(&mut self) {
        if matches!(self.phase, CreationPhase::Success | CreationPhase::Error) {
            self.phase = CreationPhase::Idle;
            self.clear_banners();
        }
    }
}

/// Polling of a provisional submission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowUpSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl From<&Config> for FollowUpSettings {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.poll_max_attempts,
        }
    }
}

/// Outcome of following up a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUp {
    /// The transcript reached a terminal status.
    Settled(TranscriptStatus),
    /// Attempts ran out; the last status seen.
    Pending(TranscriptStatus),
    /// A newer submission replaced this one.
    Superseded,
}

pub struct TranscriptCreator {
    gateway: Arc<dyn TranscriptGateway>,
    publisher: EventPublisher,
    settings: FollowUpSettings,
    state: Mutex<CreationState>,
}

impl TranscriptCreator {
    pub fn new(
        gateway: Arc<dyn TranscriptGateway>,
        publisher: EventPublisher,
        settings: FollowUpSettings,
    ) -> Self {
        Self {
            gateway,
            publisher,
            settings,
            state: Mutex::new(CreationState::default()),
        }
    }

    pub async fn snapshot(&self) -> CreationState {
        self.state.lock().await.clone()
    }

    pub async fn set_url(&self, url: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.url = url.into();
        state.field_edited();
    }

    pub async fn set_language(&self, language: Language) {
        let mut state = self.state.lock().await;
        state.language = language;
        state.field_edited();
    }

    /// Requests a transcript of `url`.
    ///
    /// Only one request may be in flight; a second one is rejected without touching
    /// state. An empty URL fails before any request is made.
    pub async fn submit(
        &self,
        url: impl Into<String>,
        language: Language,
    ) -> Result<transcripts::Submission, Error> {
        let url = url.into();
        {
            let mut state = self.state.lock().await;
            if state.phase == CreationPhase::Submitting {
                return Err(Error::validation(ValidationErrorKind::SubmissionInProgress));
            }

            state.url = url.clone();
            state.language = language.clone();
            state.clear_banners();
            state.submission = None;
            // Every attempt, even an invalid one, retires older follow-ups.
            state.generation.advance();

            if url.trim().is_empty() {
                let err = Error::validation(ValidationErrorKind::EmptyUrl);
                state.phase = CreationPhase::Error;
                state.message = Some(EMPTY_URL.to_string());
                state.last_error = Some(err.error_kind.clone());
                return Err(err);
            }

            state.phase = CreationPhase::Submitting;
        }
        info!("Requesting transcript of {} ({})", url.trim(), language.code());

        let result = self.gateway.create(url.trim(), &language).await;

        {
            let mut state = self.state.lock().await;
            match &result {
                Ok(submission) => {
                    state.phase = CreationPhase::Success;
                    state.url.clear();
                    state.preview = submission.transcript.clone();
                    state.message = Some(
                        match submission.effective_status() {
                            TranscriptStatus::Completed => GENERATED,
                            TranscriptStatus::Failed => FAILED,
                            _ => QUEUED,
                        }
                        .to_string(),
                    );
                    state.submission = Some(submission.clone());
                }
                Err(e) => {
                    state.phase = CreationPhase::Error;
                    state.message = Some(
                        e.error_kind
                            .detail()
                            .unwrap_or(GENERIC_FAILURE)
                            .to_string(),
                    );
                    state.last_error = Some(e.error_kind.clone());
                }
            }
        }

        match result {
            Ok(submission) => {
                self.publisher
                    .publish(ClientEvent::RefreshRequested {
                        reason: RefreshReason::TranscriptCreated,
                    })
                    .await;
                Ok(submission)
            }
            Err(e) => {
                warn!("Transcription request failed: {e}");
                Err(e)
            }
        }
    }

    /// Polls a provisional submission until it is completed or failed.
    ///
    /// Gives up after the configured number of attempts. A submission that already
    /// settled returns at once.
    pub async fn follow_up(&self, submission: &transcripts::Submission) -> Result<FollowUp, Error> {
        let mut status = submission.effective_status();
        if status.is_terminal() {
            return Ok(FollowUp::Settled(status));
        }

        let ticket = {
            let state = self.state.lock().await;
            match &state.submission {
                Some(current) if current.id == submission.id => state.generation.ticket(),
                _ => return Ok(FollowUp::Superseded),
            }
        };

        for attempt in 1..=self.settings.max_attempts {
            tokio::time::sleep(self.settings.interval).await;
            if !self.state.lock().await.generation.accepts(ticket) {
                debug!("Follow-up of transcript {} superseded", submission.id);
                return Ok(FollowUp::Superseded);
            }

            let record = match self.gateway.fetch_one(&submission.id).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to check transcript {}: {e}", submission.id);
                    let mut state = self.state.lock().await;
                    if state.generation.accepts(ticket) {
                        state.last_error = Some(e.error_kind.clone());
                    }
                    return Err(e);
                }
            };

            status = record.status;
            if !status.is_terminal() {
                trace!(
                    "Transcript {} still {status} after {attempt} checks",
                    submission.id
                );
                continue;
            }

            info!("Transcript {} settled as {status}", submission.id);
            {
                let mut state = self.state.lock().await;
                if state.generation.accepts(ticket) && state.phase == CreationPhase::Success {
                    state.preview = record.transcript_text.clone();
                    state.message = Some(
                        match status {
                            TranscriptStatus::Completed => GENERATED,
                            _ => FAILED,
                        }
                        .to_string(),
                    );
                }
            }
            self.publisher
                .publish(ClientEvent::RefreshRequested {
                    reason: RefreshReason::TranscriptSettled,
                })
                .await;
            return Ok(FollowUp::Settled(status));
        }

        info!(
            "Transcript {} still {status} after {} checks; giving up",
            submission.id, self.settings.max_attempts
        );
        Ok(FollowUp::Pending(status))
    }
}
