//! Error types for the `domain` layer.
use entity::transcript_status::TranscriptStatus;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors are modeled as a tree with `domain::error::Error` as the root holding a tree of
/// `error_kind` enums. The `source` field keeps the original error (usually a
/// `reqwest::Error`) for logging. Controllers only ever look at `error_kind`; it is
/// `Clone` so that a failure can be parked in controller state for the presenter.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Failures detected inside the client, before or without talking to the service.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalErrorKind {
    /// A precondition checked before any network call.
    Validation(ValidationErrorKind),
    /// Unusable configuration, e.g. a base URL that cannot carry a path.
    Config,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    /// Transcription requested without a video URL.
    EmptyUrl,
    /// Save attempted on a transcript that is not completed.
    NotEditable(TranscriptStatus),
    /// The workflow is not in a phase that allows the operation.
    NotReady,
    /// A transcription request is already in flight.
    SubmissionInProgress,
}

/// Failures reported by, or on the way to, the transcript service.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalErrorKind {
    /// Unreachable service, refused connection or timeout.
    Network,
    /// Non-success response, with the service's `detail` message when it sent one.
    Rejected { status: u16, detail: Option<String> },
    /// The addressed transcript does not exist (any more).
    NotFound,
    /// A success response whose body could not be understood.
    InvalidResponse,
    Other(String),
}

impl Error {
    pub fn validation(kind: ValidationErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(kind)),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.error_kind.is_not_found()
    }
}

impl DomainErrorKind {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainErrorKind::External(ExternalErrorKind::NotFound))
    }

    /// Transport-level failure: nothing is known about what the service did.
    pub fn is_transport(&self) -> bool {
        matches!(self, DomainErrorKind::External(ExternalErrorKind::Network))
    }

    /// Server-supplied explanation, if the service sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            DomainErrorKind::External(ExternalErrorKind::Rejected {
                detail: Some(detail),
                ..
            }) => Some(detail.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainErrorKind::Internal(InternalErrorKind::Validation(kind)) => match kind {
                ValidationErrorKind::EmptyUrl => write!(f, "a video URL is required"),
                ValidationErrorKind::NotEditable(status) => {
                    write!(f, "a {status} transcript cannot be edited")
                }
                ValidationErrorKind::NotReady => write!(f, "operation not allowed right now"),
                ValidationErrorKind::SubmissionInProgress => {
                    write!(f, "a transcription request is already in progress")
                }
            },
            DomainErrorKind::Internal(InternalErrorKind::Config) => {
                write!(f, "invalid client configuration")
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(message)) => {
                write!(f, "{message}")
            }
            DomainErrorKind::External(ExternalErrorKind::Network) => {
                write!(f, "transcript service unreachable")
            }
            DomainErrorKind::External(ExternalErrorKind::Rejected { status, detail }) => {
                match detail {
                    Some(detail) => write!(f, "request rejected ({status}): {detail}"),
                    None => write!(f, "request rejected ({status})"),
                }
            }
            DomainErrorKind::External(ExternalErrorKind::NotFound) => {
                write!(f, "transcript not found")
            }
            DomainErrorKind::External(ExternalErrorKind::InvalidResponse) => {
                write!(f, "invalid response from transcript service")
            }
            DomainErrorKind::External(ExternalErrorKind::Other(message)) => {
                write!(f, "{message}")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {}", self.error_kind)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance or a
        // request. This type of error occurs prior to any network calls being made.
        let error_kind = if err.is_builder() {
            DomainErrorKind::Internal(InternalErrorKind::Config)
        // The service answered but the body did not match the expected shape.
        } else if err.is_decode() {
            DomainErrorKind::External(ExternalErrorKind::InvalidResponse)
        // Errors that result from issues with the network call itself.
        } else {
            DomainErrorKind::External(ExternalErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
