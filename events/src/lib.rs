//! Client-side event plumbing for the transcript admin client.
//!
//! Controllers never reach into each other's state. When one of them finishes
//! something another one must react to, it publishes a [`ClientEvent`]:
//!
//! - **ClientEvent**: everything a controller can announce
//! - **EventHandler**: implemented by whoever reacts (the record store, the presenter)
//! - **EventPublisher**: fans an event out to the registered handlers
//!
//! This crate has no dependencies on the other workspace crates, so ids and
//! links travel as plain strings.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Why a refresh of the record list was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshReason {
    /// A transcription request was accepted.
    TranscriptCreated,
    /// A provisional transcript reached `completed` or `failed`.
    TranscriptSettled,
    /// Edited transcript text was saved.
    TranscriptUpdated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// The server-side collection changed; the record list should be re-queried.
    RefreshRequested { reason: RefreshReason },
    /// The presentation layer should navigate to `uri` (a file download).
    /// No state changes in the client when this is emitted.
    OpenDownload { transcript_id: String, uri: String },
}

/// Trait for reacting to client events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &ClientEvent);
}

/// Publishes client events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Publishers handed out earlier keep their old handler list.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers, awaiting each in turn.
    pub async fn publish(&self, event: ClientEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    #[cfg(test)]
    fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
