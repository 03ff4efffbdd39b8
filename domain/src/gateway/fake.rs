//! Scripted in-memory gateway for controller tests.
//!
//! Responses can be held back behind a gate until the test releases them, which is how
//! tests decide the order in which overlapping requests complete.

use super::{resource_url, TranscriptGateway};
use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use async_trait::async_trait;
use entity::{language::Language, transcript_status::TranscriptStatus, transcripts, Id};
use events::{ClientEvent, EventHandler};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;
use url::Url;

pub(crate) const BASE_URL: &str = "http://transcripts.test";

struct Scripted<T> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<T, DomainErrorKind>,
}

#[derive(Default)]
struct Inner {
    records: Vec<transcripts::Model>,
    list_script: VecDeque<Scripted<Vec<transcripts::Model>>>,
    fetch_script: HashMap<Id, VecDeque<Scripted<transcripts::Model>>>,
    gates: HashMap<String, oneshot::Receiver<()>>,
    failures: HashMap<String, DomainErrorKind>,
    create_response: Option<transcripts::Submission>,
    kept_on_delete: HashSet<Id>,
    calls: Vec<String>,
}

pub(crate) struct FakeGateway {
    base_url: Url,
    inner: Mutex<Inner>,
}

pub(crate) fn record(id: &str, youtube_url: &str, status: TranscriptStatus) -> transcripts::Model {
    transcripts::Model {
        id: Id::from(id),
        youtube_url: youtube_url.to_string(),
        language: Language::English,
        status,
        transcript_text: match status {
            TranscriptStatus::Completed => Some(format!("text of {id}")),
            _ => None,
        },
        audio_file: None,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn not_found() -> DomainErrorKind {
    DomainErrorKind::External(ExternalErrorKind::NotFound)
}

pub(crate) fn network() -> DomainErrorKind {
    DomainErrorKind::External(ExternalErrorKind::Network)
}

pub(crate) fn rejected(status: u16, detail: Option<&str>) -> DomainErrorKind {
    DomainErrorKind::External(ExternalErrorKind::Rejected {
        status,
        detail: detail.map(str::to_string),
    })
}

fn failure(kind: DomainErrorKind) -> Error {
    Error {
        source: None,
        error_kind: kind,
    }
}

async fn pass(gate: Option<oneshot::Receiver<()>>) {
    if let Some(gate) = gate {
        // A dropped sender opens the gate too.
        let _ = gate.await;
    }
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub(crate) fn with_records(records: Vec<transcripts::Model>) -> Self {
        Self {
            base_url: Url::parse(BASE_URL).unwrap(),
            inner: Mutex::new(Inner {
                records,
                ..Inner::default()
            }),
        }
    }

    /// Queues a response for the next unscripted `list` call, held until the sender fires.
    pub(crate) fn script_list(
        &self,
        result: Result<Vec<transcripts::Model>, DomainErrorKind>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().unwrap().list_script.push_back(Scripted {
            gate: Some(rx),
            result,
        });
        tx
    }

    /// Queues a response for the next `fetch_one(id)`, held until the sender fires.
    pub(crate) fn script_fetch(
        &self,
        id: &str,
        result: Result<transcripts::Model, DomainErrorKind>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push_fetch_scripted(id, Some(rx), result);
        tx
    }

    /// Queues an immediate response for the next `fetch_one(id)`.
    pub(crate) fn push_fetch(&self, id: &str, result: Result<transcripts::Model, DomainErrorKind>) {
        self.push_fetch_scripted(id, None, result);
    }

    fn push_fetch_scripted(
        &self,
        id: &str,
        gate: Option<oneshot::Receiver<()>>,
        result: Result<transcripts::Model, DomainErrorKind>,
    ) {
        self.inner
            .lock()
            .unwrap()
            .fetch_script
            .entry(Id::from(id))
            .or_default()
            .push_back(Scripted { gate, result });
    }

    /// Holds the next call named `key` (`create`, `update:<id>`, `delete:<id>`).
    pub(crate) fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().unwrap().gates.insert(key.to_string(), rx);
        tx
    }

    /// Makes every call named `key` fail with `kind`.
    pub(crate) fn fail(&self, key: &str, kind: DomainErrorKind) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .insert(key.to_string(), kind);
    }

    /// Deletes of `id` succeed but the service keeps listing the record.
    pub(crate) fn keep_after_delete(&self, id: &str) {
        self.inner
            .lock()
            .unwrap()
            .kept_on_delete
            .insert(Id::from(id));
    }

    pub(crate) fn respond_to_create(&self, submission: transcripts::Submission) {
        self.inner.lock().unwrap().create_response = Some(submission);
    }

    pub(crate) fn set_records(&self, records: Vec<transcripts::Model>) {
        self.inner.lock().unwrap().records = records;
    }

    pub(crate) fn records(&self) -> Vec<transcripts::Model> {
        self.inner.lock().unwrap().records.clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self, prefix: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Yields until at least `count` calls starting with `prefix` have been made.
    pub(crate) async fn wait_for_calls(&self, prefix: &str, count: usize) {
        while self.call_count(prefix) < count {
            tokio::task::yield_now().await;
        }
    }

    /// Records the call and returns its gate and configured failure, if any.
    fn enter(&self, key: String) -> (Option<oneshot::Receiver<()>>, Option<DomainErrorKind>) {
        let mut inner = self.inner.lock().unwrap();
        let gate = inner.gates.remove(&key);
        let failure = inner.failures.get(&key).cloned();
        inner.calls.push(key);
        (gate, failure)
    }
}

#[async_trait]
impl TranscriptGateway for FakeGateway {
    async fn create(
        &self,
        youtube_url: &str,
        language: &Language,
    ) -> Result<transcripts::Submission, Error> {
        let (gate, fail) = self.enter("create".to_string());
        pass(gate).await;
        if let Some(kind) = fail {
            return Err(failure(kind));
        }

        let mut inner = self.inner.lock().unwrap();
        let submission = match inner.create_response.take() {
            Some(submission) => submission,
            None => transcripts::Submission {
                id: Id::from((inner.records.len() + 1) as i64),
                status: None,
                transcript: Some(format!("transcript of {youtube_url}")),
                audio_file: None,
            },
        };
        inner.records.insert(
            0,
            transcripts::Model {
                id: submission.id.clone(),
                youtube_url: youtube_url.to_string(),
                language: language.clone(),
                status: submission.effective_status(),
                transcript_text: submission.transcript.clone(),
                audio_file: submission.audio_file.clone(),
                created_at: None,
                updated_at: None,
            },
        );
        Ok(submission)
    }

    async fn list(&self) -> Result<Vec<transcripts::Model>, Error> {
        let (scripted, fail) = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push("list".to_string());
            (
                inner.list_script.pop_front(),
                inner.failures.get("list").cloned(),
            )
        };

        if let Some(Scripted { gate, result }) = scripted {
            pass(gate).await;
            return result.map_err(failure);
        }
        if let Some(kind) = fail {
            return Err(failure(kind));
        }
        Ok(self.records())
    }

    async fn fetch_one(&self, id: &Id) -> Result<transcripts::Model, Error> {
        let key = format!("fetch:{id}");
        let (scripted, fail) = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(key.clone());
            let scripted = inner
                .fetch_script
                .get_mut(id)
                .and_then(|queue| queue.pop_front());
            (scripted, inner.failures.get(&key).cloned())
        };

        if let Some(Scripted { gate, result }) = scripted {
            pass(gate).await;
            return result.map_err(failure);
        }
        if let Some(kind) = fail {
            return Err(failure(kind));
        }
        self.records()
            .into_iter()
            .find(|record| &record.id == id)
            .ok_or_else(|| failure(not_found()))
    }

    async fn update(&self, id: &Id, transcript_text: &str) -> Result<transcripts::Model, Error> {
        let (gate, fail) = self.enter(format!("update:{id}"));
        pass(gate).await;
        if let Some(kind) = fail {
            return Err(failure(kind));
        }

        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| failure(not_found()))?;
        record.transcript_text = Some(transcript_text.to_string());
        Ok(record.clone())
    }

    async fn delete(&self, id: &Id) -> Result<(), Error> {
        let (gate, fail) = self.enter(format!("delete:{id}"));
        pass(gate).await;
        if let Some(kind) = fail {
            return Err(failure(kind));
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.kept_on_delete.contains(id) {
            return Ok(());
        }
        let before = inner.records.len();
        inner.records.retain(|record| &record.id != id);
        if inner.records.len() == before {
            return Err(failure(not_found()));
        }
        Ok(())
    }

    fn download_reference(&self, id: &Id) -> Result<Url, Error> {
        resource_url(&self.base_url, &["transcripts", id.as_str(), "download"])
    }

    fn audio_reference(&self, audio_file: &str) -> Result<Url, Error> {
        resource_url(&self.base_url, &["audio", audio_file])
    }
}

/// Event handler that remembers everything it was handed.
#[derive(Default)]
pub(crate) struct RecordingHandler {
    events: Mutex<Vec<ClientEvent>>,
}

impl RecordingHandler {
    pub(crate) fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: &ClientEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
