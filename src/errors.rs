use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::domain::apply::dto::apply_report_dto::ApplyReport;
use crate::domain::apply::kind_table::Kind;

/// Failure of a single call against the remote resource store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid: {0}")]
    Invalid(String),
}

impl StoreError {
    /// Classifies an API status returned by the store.
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match StatusCode::from_u16(code) {
            Ok(StatusCode::NOT_FOUND) => StoreError::NotFound(message),
            Ok(StatusCode::CONFLICT) => StoreError::Conflict(message),
            Ok(StatusCode::BAD_REQUEST) | Ok(StatusCode::UNPROCESSABLE_ENTITY) => {
                StoreError::Invalid(message)
            }
            _ => StoreError::Transport(format!("{} (status {})", message, code)),
        }
    }
}

impl From<kube::Error> for StoreError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(status) => StoreError::from_status(status.code, status.message.clone()),
            other => StoreError::Transport(other.to_string()),
        }
    }
}

/// A document that could not be turned into a tagged resource.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("document is not a mapping")]
    NotAMapping,

    #[error("missing or non-string `{0}`")]
    MissingField(&'static str),

    #[error("{kind} does not match its schema: {source}")]
    Shape {
        kind: Kind,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Remote call issued by the apply operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Get,
    Create,
    Update,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            StoreOp::List => "list",
            StoreOp::Get => "get",
            StoreOp::Create => "create",
            StoreOp::Update => "update",
        };
        f.write_str(verb)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Decode error in document {document}: {source}")]
    Decode {
        document: usize,
        #[source]
        source: DecodeError,
    },

    #[error("{kind} has no metadata.name")]
    MissingName { kind: Kind },

    #[error("Failed to {op} {kind} '{name}': {source}")]
    Store {
        op: StoreOp,
        kind: Kind,
        name: String,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    pub fn store(op: StoreOp, kind: Kind, name: &str, source: StoreError) -> Self {
        AppError::Store {
            op,
            kind,
            name: name.to_string(),
            source,
        }
    }

    /// The underlying store failure, if this error came from a remote call.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            AppError::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A run that stopped at its first fatal error. `report` holds what was
/// applied before the failing document; nothing is rolled back.
#[derive(Debug, Error)]
#[error("apply aborted at document {document}: {error}")]
pub struct ApplyFailure {
    pub document: usize,
    #[source]
    pub error: AppError,
    pub report: ApplyReport,
}
