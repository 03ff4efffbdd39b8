//! HTTP client for the transcript service.
//!
//! The service exposes a small REST surface:
//!
//! | operation | request |
//! |-----------|---------|
//! | create    | `POST /transcribe` with `{youtube_url, language}` |
//! | list      | `GET /transcripts` |
//! | fetch     | `GET /transcripts/{id}` |
//! | update    | `PUT /transcripts/{id}` with `{transcript_text}` |
//! | delete    | `DELETE /transcripts/{id}` |
//!
//! plus two plain links that are handed to the operator, never requested here:
//! `GET /transcripts/{id}/download` and `GET /audio/{audio_file}`.
//!
//! Failures carry the service's `detail` message when the body has one.

use super::{resource_url, TranscriptGateway};
use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use async_trait::async_trait;
use entity::{language::Language, transcripts, Id};
use log::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use service::AppState;
use url::Url;

/// Request to transcribe a video
#[derive(Debug, Serialize)]
pub struct CreateTranscriptRequest<'a> {
    pub youtube_url: &'a str,
    pub language: &'a str,
}

/// Request to replace the text of a transcript
#[derive(Debug, Serialize)]
pub struct UpdateTranscriptRequest<'a> {
    pub transcript_text: &'a str,
}

/// Error body returned by the service on failures
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// How a 404 is interpreted.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Scope {
    /// Collection endpoints: a 404 is an ordinary rejection.
    Collection,
    /// Single-record endpoints: a 404 means the transcript is gone.
    Record,
}

/// Transcript service API client
pub struct TranscriptServiceClient {
    client: reqwest::Client,
    base_url: Url,
}

impl TranscriptServiceClient {
    /// Create a client that sends requests relative to `base_url`.
    pub fn new(client: reqwest::Client, base_url: Url) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            warn!("Transcript service URL {base_url} cannot carry a path");
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            });
        }
        Ok(Self { client, base_url })
    }

    pub fn from_app_state(app_state: &AppState) -> Result<Self, Error> {
        Self::new(
            app_state.http_client.clone(),
            app_state.config.base_url().clone(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        resource_url(&self.base_url, segments)
    }

    /// Sends `request`, turning transport failures and non-success statuses into errors.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        scope: Scope,
        action: &str,
    ) -> Result<reqwest::Response, Error> {
        let response = request.send().await.map_err(|e| {
            warn!("Failed to {action}: {e:?}");
            Error::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::NOT_FOUND && scope == Scope::Record {
            warn!("Failed to {action}: transcript not found");
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::NotFound),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body);
        error!(
            "Transcript service rejected request to {action} ({status}): {}",
            detail.as_deref().unwrap_or("<no detail>")
        );
        Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Rejected {
                status: status.as_u16(),
                detail,
            }),
        })
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> Result<T, Error> {
        response.json::<T>().await.map_err(|e| {
            warn!("Failed to parse response to {action}: {e:?}");
            Error::from(e)
        })
    }
}

/// Extracts a human-readable message from an error body.
///
/// The service answers `{"detail": "..."}`; validation failures carry a list of
/// `{"msg": ...}` objects instead. Bodies of any other shape (proxy error pages, plain
/// text) carry no usable detail.
fn error_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body.trim()) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => Some(detail),
        Ok(ErrorBody {
            detail: serde_json::Value::Array(items),
        }) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .collect();
            if messages.is_empty() {
                Some(serde_json::Value::Array(items.clone()).to_string())
            } else {
                Some(messages.join("; "))
            }
        }
        Ok(ErrorBody {
            detail: serde_json::Value::Null,
        }) => None,
        Ok(ErrorBody { detail }) => Some(detail.to_string()),
        Err(_) => None,
    }
}

#[async_trait]
impl TranscriptGateway for TranscriptServiceClient {
    async fn create(
        &self,
        youtube_url: &str,
        language: &Language,
    ) -> Result<transcripts::Submission, Error> {
        let url = self.endpoint(&["transcribe"])?;
        let request = CreateTranscriptRequest {
            youtube_url,
            language: language.code(),
        };

        debug!("Requesting transcript of {youtube_url} in {}", language.code());

        let response = self
            .send(
                self.client.post(url).json(&request),
                Scope::Collection,
                "create transcript",
            )
            .await?;
        let submission: transcripts::Submission =
            Self::parse(response, "create transcript").await?;

        info!(
            "Created transcript {} ({})",
            submission.id,
            submission.effective_status()
        );
        Ok(submission)
    }

    async fn list(&self) -> Result<Vec<transcripts::Model>, Error> {
        let url = self.endpoint(&["transcripts"])?;
        let response = self
            .send(self.client.get(url), Scope::Collection, "list transcripts")
            .await?;
        let records: Vec<transcripts::Model> = Self::parse(response, "list transcripts").await?;

        debug!("Listed {} transcripts", records.len());
        Ok(records)
    }

    async fn fetch_one(&self, id: &Id) -> Result<transcripts::Model, Error> {
        let url = self.endpoint(&["transcripts", id.as_str()])?;
        let response = self
            .send(self.client.get(url), Scope::Record, "fetch transcript")
            .await?;
        let record: transcripts::Model = Self::parse(response, "fetch transcript").await?;

        debug!("Fetched transcript {} ({})", record.id, record.status);
        Ok(record)
    }

    async fn update(&self, id: &Id, transcript_text: &str) -> Result<transcripts::Model, Error> {
        let url = self.endpoint(&["transcripts", id.as_str()])?;
        let request = UpdateTranscriptRequest { transcript_text };

        let response = self
            .send(
                self.client.put(url).json(&request),
                Scope::Record,
                "update transcript",
            )
            .await?;
        let record: transcripts::Model = Self::parse(response, "update transcript").await?;

        info!("Updated transcript {}", record.id);
        Ok(record)
    }

    async fn delete(&self, id: &Id) -> Result<(), Error> {
        let url = self.endpoint(&["transcripts", id.as_str()])?;
        self.send(self.client.delete(url), Scope::Record, "delete transcript")
            .await?;

        info!("Deleted transcript {id}");
        Ok(())
    }

    fn download_reference(&self, id: &Id) -> Result<Url, Error> {
        self.endpoint(&["transcripts", id.as_str(), "download"])
    }

    fn audio_reference(&self, audio_file: &str) -> Result<Url, Error> {
        self.endpoint(&["audio", audio_file])
    }
}
