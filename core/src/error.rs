//! Error types for the survey API client.
//!
//! # Design
//! `ValidationError` is the only error raised synchronously, by the façade,
//! before a request exists. Everything that happens during an exchange is
//! classified into `ApiError` and delivered as the request's failure
//! outcome. All errors are `Clone` because one outcome is shared by every
//! observer of a request.

use thiserror::Error;

use crate::request::RequestId;
use serde_json::Value;

/// A required argument was missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{0}` argument is required")]
    MissingArgument(&'static str),

    #[error("`{name}` {reason}")]
    InvalidArgument { name: &'static str, reason: String },
}

impl ValidationError {
    /// Name of the offending argument.
    pub fn argument(&self) -> &'static str {
        match self {
            ValidationError::MissingArgument(name) => name,
            ValidationError::InvalidArgument { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportErrorKind {
    #[error("timeout")]
    Timeout,
    #[error("connection failed")]
    Connection,
    #[error("transport failure")]
    Other,
}

/// A network-level failure reported by an executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connection, message)
    }
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transport,
    InvalidStatus,
    Decode,
    Validation,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::InvalidStatus => "invalid-status",
            FailureKind::Decode => "decode",
            FailureKind::Validation => "validation",
        }
    }
}

/// Failure of an API call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The exchange never produced a response.
    #[error("request {request_id} failed: {source}")]
    Transport {
        request_id: RequestId,
        source: TransportError,
    },

    /// The server answered with a status outside the accepted set.
    #[error("request {request_id} returned invalid status code {status}")]
    InvalidStatus {
        request_id: RequestId,
        status: u16,
        headers: Vec<(String, String)>,
        body: Value,
    },

    /// The success payload did not match the type asked for.
    #[error("request {request_id} payload could not be decoded: {message}")]
    Decode { request_id: RequestId, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Transport { .. } => FailureKind::Transport,
            ApiError::InvalidStatus { .. } => FailureKind::InvalidStatus,
            ApiError::Decode { .. } => FailureKind::Decode,
            ApiError::Validation(_) => FailureKind::Validation,
        }
    }

    /// Correlation id of the request that failed, if one was created.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            ApiError::Transport { request_id, .. }
            | ApiError::InvalidStatus { request_id, .. }
            | ApiError::Decode { request_id, .. } => Some(*request_id),
            ApiError::Validation(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while building a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown environment `{0}`. available are: sandbox, production")]
    UnknownEnvironment(String),

    #[error("invalid timeout `{0}`: expected a whole number of seconds")]
    InvalidTimeout(String),

    #[error("no API key configured")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_argument_names_the_argument() {
        let err = ValidationError::MissingArgument("QuestionID");
        assert_eq!(err.to_string(), "`QuestionID` argument is required");
        assert_eq!(err.argument(), "QuestionID");
    }

    #[test]
    fn failure_kind_strings() {
        let id = RequestId::new();
        let transport = ApiError::Transport {
            request_id: id,
            source: TransportError::timeout("60s elapsed"),
        };
        assert_eq!(transport.kind().as_str(), "transport");
        assert_eq!(transport.request_id(), Some(id));
        assert!(transport.to_string().contains(&id.to_string()));

        let status = ApiError::InvalidStatus {
            request_id: id,
            status: 500,
            headers: Vec::new(),
            body: Value::Null,
        };
        assert_eq!(status.kind().as_str(), "invalid-status");
        assert_eq!(status.status(), Some(500));
    }

    #[test]
    fn validation_converts_into_api_error() {
        let err: ApiError = ValidationError::MissingArgument("SurveyNumber").into();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.request_id(), None);
        assert_eq!(err.to_string(), "`SurveyNumber` argument is required");
    }
}
