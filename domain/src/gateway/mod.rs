//! Access to the remote transcript service.
//!
//! Controllers only ever talk to the service through [`TranscriptGateway`], which keeps
//! them independent of the wire format and lets tests script the service's behavior.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use entity::{language::Language, transcripts, Id};
use log::*;
use url::Url;

#[cfg(test)]
pub(crate) mod fake;
pub mod transcript_service;

#[async_trait]
pub trait TranscriptGateway: Send + Sync {
    /// Asks the service to transcribe the audio of `youtube_url`.
    async fn create(&self, youtube_url: &str, language: &Language)
        -> Result<transcripts::Submission, Error>;

    /// Every transcript the service knows, in the service's order.
    async fn list(&self) -> Result<Vec<transcripts::Model>, Error>;

    async fn fetch_one(&self, id: &Id) -> Result<transcripts::Model, Error>;

    /// Replaces the transcript text and returns the record as stored.
    async fn update(&self, id: &Id, transcript_text: &str) -> Result<transcripts::Model, Error>;

    async fn delete(&self, id: &Id) -> Result<(), Error>;

    /// Link to the plain-text export of a transcript. No request is made.
    fn download_reference(&self, id: &Id) -> Result<Url, Error>;

    /// Link to the extracted audio of a transcript. No request is made.
    fn audio_reference(&self, audio_file: &str) -> Result<Url, Error>;
}

/// Appends `segments` to the path of `base`, percent-encoding each one.
pub(crate) fn resource_url(base: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            warn!("Base URL {base} cannot carry a path");
            Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
