//! The record store: the operator's view of every transcript the service holds.
//!
//! The collection is owned here and only ever replaced wholesale by a successful
//! refresh. Nothing else mutates it; other controllers ask for a refresh through
//! [`ClientEvent::RefreshRequested`], which the store handles as an [`EventHandler`].

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, ValidationErrorKind};
use crate::gateway::TranscriptGateway;
use crate::generation::{RequestGeneration, Resolution};
use async_trait::async_trait;
use entity::{transcripts, Id};
use events::{ClientEvent, EventHandler, EventPublisher};
use log::*;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Store operations that can leave a failure behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOperation {
    Refresh,
    Delete,
}

/// The most recent failure of a store operation.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreFailure {
    pub operation: StoreOperation,
    pub kind: DomainErrorKind,
}

impl StoreFailure {
    pub fn message(&self) -> &'static str {
        match self.operation {
            StoreOperation::Refresh => "Failed to load transcripts.",
            StoreOperation::Delete => "Failed to delete transcript.",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreState {
    /// Last successfully listed collection, in the service's order.
    pub records: Vec<transcripts::Model>,
    pub search_query: String,
    /// A refresh is in flight.
    pub loading: bool,
    /// At least one refresh has succeeded.
    pub loaded: bool,
    pub last_error: Option<StoreFailure>,
    /// Row whose context menu is open. At most one.
    pub active_menu_row_id: Option<Id>,
    pub refresh_generation: RequestGeneration,
}

impl StoreState {
    /// Records whose source URL contains the search query, ignoring case.
    pub fn visible_records(&self) -> Vec<&transcripts::Model> {
        self.records
            .iter()
            .filter(|record| record.matches_query(&self.search_query))
            .collect()
    }

    pub fn find(&self, id: &Id) -> Option<&transcripts::Model> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.last_error.as_ref().map(StoreFailure::message)
    }
}

pub struct TranscriptStore {
    gateway: Arc<dyn TranscriptGateway>,
    presenter: EventPublisher,
    state: Mutex<StoreState>,
}

impl TranscriptStore {
    /// `presenter` receives the navigation requests (downloads) the store emits.
    pub fn new(gateway: Arc<dyn TranscriptGateway>, presenter: EventPublisher) -> Self {
        Self {
            gateway,
            presenter,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }

    pub async fn visible_records(&self) -> Vec<transcripts::Model> {
        let state = self.state.lock().await;
        state.visible_records().into_iter().cloned().collect()
    }

    pub async fn error_message(&self) -> Option<&'static str> {
        self.state.lock().await.error_message()
    }

    /// Re-queries the whole collection.
    ///
    /// Only the newest refresh may touch state when it resolves; an older one that
    /// resolves later is dropped.
    pub async fn refresh(&self) -> Resolution {
        let ticket = {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.refresh_generation.advance()
        };
        debug!("Refresh {ticket} started");

        let result = self.gateway.list().await;

        let mut state = self.state.lock().await;
        if !state.refresh_generation.accepts(ticket) {
            debug!(
                "Refresh {ticket} superseded by generation {}; discarding",
                state.refresh_generation
            );
            return Resolution::Superseded;
        }

        state.loading = false;
        match result {
            Ok(records) => {
                debug!("Refresh {ticket} loaded {} transcripts", records.len());
                state.records = records;
                state.loaded = true;
                state.last_error = None;
                if let Some(menu_row) = state.active_menu_row_id.clone() {
                    if state.find(&menu_row).is_none() {
                        state.active_menu_row_id = None;
                    }
                }
                Resolution::Applied
            }
            Err(e) => {
                warn!("Refresh {ticket} failed: {e}");
                state.last_error = Some(StoreFailure {
                    operation: StoreOperation::Refresh,
                    kind: e.error_kind,
                });
                Resolution::Failed
            }
        }
    }

    pub async fn set_search_query(&self, query: impl Into<String>) {
        self.state.lock().await.search_query = query.into();
    }

    /// Opens the context menu of `row_id`, closing any other.
    pub async fn open_menu(&self, row_id: &Id) {
        self.state.lock().await.active_menu_row_id = Some(row_id.clone());
    }

    pub async fn close_menu(&self) {
        self.state.lock().await.active_menu_row_id = None;
    }

    /// Deletes a transcript on the service and re-lists.
    ///
    /// The row is never removed locally; it disappears once a refresh no longer
    /// lists it. A transcript that is already gone counts as deleted.
    pub async fn request_delete(&self, row_id: &Id) -> Result<(), Error> {
        {
            let mut state = self.state.lock().await;
            if state.active_menu_row_id.as_ref() == Some(row_id) {
                state.active_menu_row_id = None;
            }
        }

        match self.gateway.delete(row_id).await {
            Ok(()) => {
                self.refresh().await;
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!("Transcript {row_id} was already gone");
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to delete transcript {row_id}: {e}");
                // The service answered, so its collection may have changed anyway.
                if matches!(
                    e.error_kind,
                    DomainErrorKind::External(ExternalErrorKind::Rejected { .. })
                ) {
                    self.refresh().await;
                }
                self.state.lock().await.last_error = Some(StoreFailure {
                    operation: StoreOperation::Delete,
                    kind: e.error_kind.clone(),
                });
                Err(e)
            }
        }
    }

    /// Asks the presenter to navigate to the plain-text export of `row_id`.
    pub async fn request_download(&self, row_id: &Id) -> Result<Url, Error> {
        let uri = self.gateway.download_reference(row_id)?;
        debug!("Requesting download of transcript {row_id} from {uri}");

        self.presenter
            .publish(ClientEvent::OpenDownload {
                transcript_id: row_id.to_string(),
                uri: uri.to_string(),
            })
            .await;
        Ok(uri)
    }

    /// Audio link of a loaded record, `None` when the service kept no audio.
    pub async fn audio_link(&self, row_id: &Id) -> Result<Option<Url>, Error> {
        let audio_file = {
            let state = self.state.lock().await;
            let record = state
                .find(row_id)
                .ok_or_else(|| Error::validation(ValidationErrorKind::NotReady))?;
            record.audio_file.clone()
        };

        audio_file
            .map(|file| self.gateway.audio_reference(&file))
            .transpose()
    }
}

#[async_trait]
impl EventHandler for TranscriptStore {
    async fn handle(&self, event: &ClientEvent) {
        if let ClientEvent::RefreshRequested { reason } = event {
            debug!("Refreshing transcripts: {reason:?}");
            self.refresh().await;
        }
    }
}
