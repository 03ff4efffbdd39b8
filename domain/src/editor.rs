//! Single-transcript editor.
//!
//! Opening a transcript always re-fetches it, so edits start from the service's copy
//! rather than from whatever the list showed. Only completed transcripts can be saved.

use crate::error::{DomainErrorKind, Error, ValidationErrorKind};
use crate::gateway::TranscriptGateway;
use crate::generation::{RequestGeneration, Resolution};
use entity::{transcripts, Id};
use events::{ClientEvent, EventPublisher, RefreshReason};
use log::*;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditorPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Saving,
    Done,
    Error,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorState {
    pub phase: EditorPhase,
    /// Transcript the operator asked for; set as soon as loading starts.
    pub requested_id: Option<Id>,
    /// Authoritative copy, present once loaded.
    pub record: Option<transcripts::Model>,
    pub text: String,
    pub word_count: usize,
    pub last_error: Option<DomainErrorKind>,
    generation: RequestGeneration,
}

impl EditorState {
    pub fn can_save(&self) -> bool {
        self.phase == EditorPhase::Ready
            && self
                .record
                .as_ref()
                .is_some_and(transcripts::Model::is_editable)
    }

    /// Edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        match &self.record {
            Some(record) => record.transcript_text.as_deref().unwrap_or_default() != self.text,
            None => false,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        let kind = self.last_error.as_ref()?;
        Some(match kind {
            DomainErrorKind::Internal(crate::error::InternalErrorKind::Validation(_)) => {
                kind.to_string()
            }
            _ if self.phase == EditorPhase::Error => "Failed to load transcript.".to_string(),
            _ => "Failed to update transcript.".to_string(),
        })
    }

    fn set_text(&mut self, text: String) {
        self.word_count = word_count(&text);
        self.text = text;
    }
}

/// Whitespace-delimited tokens in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub struct TranscriptEditor {
    gateway: Arc<dyn TranscriptGateway>,
    publisher: EventPublisher,
    state: Mutex<EditorState>,
}

impl TranscriptEditor {
    /// `publisher` receives the refresh request sent after a successful save.
    pub fn new(gateway: Arc<dyn TranscriptGateway>, publisher: EventPublisher) -> Self {
        Self {
            gateway,
            publisher,
            state: Mutex::new(EditorState::default()),
        }
    }

    pub async fn snapshot(&self) -> EditorState {
        self.state.lock().await.clone()
    }

    pub async fn can_save(&self) -> bool {
        self.state.lock().await.can_save()
    }

    /// Opens `record` for editing, loading the service's current copy of it.
    pub async fn open(&self, record: &transcripts::Model) -> Resolution {
        self.open_id(&record.id).await
    }

    /// Opens the transcript `id`. A later open supersedes this one even if this
    /// one's fetch resolves last.
    pub async fn open_id(&self, id: &Id) -> Resolution {
        let ticket = {
            let mut state = self.state.lock().await;
            let ticket = state.generation.advance();
            *state = EditorState {
                phase: EditorPhase::Loading,
                requested_id: Some(id.clone()),
                generation: state.generation,
                ..EditorState::default()
            };
            ticket
        };
        debug!("Loading transcript {id} for editing ({ticket})");

        let result = self.gateway.fetch_one(id).await;

        let mut state = self.state.lock().await;
        if !state.generation.accepts(ticket) {
            debug!("Discarding stale load of transcript {id} ({ticket})");
            return Resolution::Superseded;
        }

        match result {
            Ok(record) => {
                let text = record.transcript_text.clone().unwrap_or_default();
                state.set_text(text);
                state.record = Some(record);
                state.phase = EditorPhase::Ready;
                Resolution::Applied
            }
            Err(e) => {
                warn!("Failed to load transcript {id}: {e}");
                state.phase = EditorPhase::Error;
                state.last_error = Some(e.error_kind);
                Resolution::Failed
            }
        }
    }

    /// Replaces the working text. Only allowed once the transcript is loaded.
    pub async fn set_text(&self, text: impl Into<String>) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if state.phase != EditorPhase::Ready {
            return Err(Error::validation(ValidationErrorKind::NotReady));
        }
        state.set_text(text.into());
        Ok(())
    }

    /// Saves the working text.
    ///
    /// Rejected without a request unless the editor is ready and the transcript is
    /// completed. On failure the editor stays ready with the edits intact.
    pub async fn save(&self) -> Result<transcripts::Model, Error> {
        let (ticket, id, text) = {
            let mut state = self.state.lock().await;
            if state.phase != EditorPhase::Ready {
                return Err(Error::validation(ValidationErrorKind::NotReady));
            }
            let (id, status) = match &state.record {
                Some(record) => (record.id.clone(), record.status),
                None => return Err(Error::validation(ValidationErrorKind::NotReady)),
            };
            if !status.is_editable() {
                let err = Error::validation(ValidationErrorKind::NotEditable(status));
                state.last_error = Some(err.error_kind.clone());
                return Err(err);
            }

            state.phase = EditorPhase::Saving;
            state.last_error = None;
            (state.generation.ticket(), id, state.text.clone())
        };
        debug!("Saving transcript {id} ({} words)", word_count(&text));

        let result = self.gateway.update(&id, &text).await;

        {
            let mut state = self.state.lock().await;
            if state.generation.accepts(ticket) {
                match &result {
                    Ok(record) => {
                        state.record = Some(record.clone());
                        state.phase = EditorPhase::Done;
                    }
                    Err(e) => {
                        state.phase = EditorPhase::Ready;
                        state.last_error = Some(e.error_kind.clone());
                    }
                }
            } else {
                debug!("Editor moved on while saving transcript {id}");
            }
        }

        match result {
            Ok(record) => {
                info!("Saved transcript {id}");
                self.publisher
                    .publish(ClientEvent::RefreshRequested {
                        reason: RefreshReason::TranscriptUpdated,
                    })
                    .await;
                Ok(record)
            }
            Err(e) => {
                warn!("Failed to save transcript {id}: {e}");
                Err(e)
            }
        }
    }

    /// Drops the working copy and any result still in flight.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.generation.invalidate();
        *state = EditorState {
            generation: state.generation,
            ..EditorState::default()
        };
    }
}
