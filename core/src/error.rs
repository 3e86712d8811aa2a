//! Error types for the Redmine client.
//!
//! # Design
//! One enum covers every failure a caller can see, from configuration
//! mistakes caught before a request exists to HTTP statuses and malformed
//! payloads. [`RedmineError::kind`] collapses variants into the coarse
//! [`ErrorKind`] taxonomy for callers that only need to branch on the class
//! of failure.

use thiserror::Error;

use crate::registry::EntityKind;

/// Result alias used throughout the crate.
pub type RedmineResult<T> = Result<T, RedmineError>;

/// Errors returned by the client, the URL resolver and the codecs.
#[derive(Debug, Error)]
pub enum RedmineError {
    /// The transport gave up waiting for the server.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The host name could not be resolved.
    #[error("could not resolve host: {0}")]
    NameResolution(String),

    /// 404.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// 401.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 409. The resource changed on the server since it was read.
    #[error("the resource you are trying to update is stale")]
    Conflict,

    /// 422 with the server's itemized messages, in payload order.
    #[error("{operation} has invalid or missing attribute parameters: {}", messages.join("\n"))]
    Validation {
        operation: String,
        messages: Vec<String>,
    },

    /// 406.
    #[error("not acceptable: {0}")]
    NotAcceptable(String),

    /// 500.
    #[error("internal server error: {0}")]
    InternalServer(String),

    /// Any other non-2xx status, or a transport failure that is neither a
    /// timeout nor a name resolution failure (`status` is `None` then).
    #[error("{}", protocol_message(*status, message))]
    Protocol { status: Option<u16>, message: String },

    /// The entity kind has no endpoint of its own.
    #[error("entity kind `{0}` has no registered endpoint")]
    UnregisteredKind(EntityKind),

    /// A parent-scoped kind was used without its owner id.
    #[error("missing mandatory parameter `{0}`")]
    MissingParameter(&'static str),

    /// Client configuration could not be built.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An entity could not be written to the wire format.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A payload could not be read into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

fn protocol_message(status: Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("HTTP {status}: {message}"),
        None => format!("transport error: {message}"),
    }
}

/// Coarse classification of a [`RedmineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    NameResolution,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    Validation,
    NotAcceptable,
    InternalServer,
    Protocol,
    Configuration,
    Serialization,
}

impl RedmineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RedmineError::Timeout(_) => ErrorKind::Timeout,
            RedmineError::NameResolution(_) => ErrorKind::NameResolution,
            RedmineError::NotFound(_) => ErrorKind::NotFound,
            RedmineError::Unauthorized(_) => ErrorKind::Unauthorized,
            RedmineError::Forbidden(_) => ErrorKind::Forbidden,
            RedmineError::Conflict => ErrorKind::Conflict,
            RedmineError::Validation { .. } => ErrorKind::Validation,
            RedmineError::NotAcceptable(_) => ErrorKind::NotAcceptable,
            RedmineError::InternalServer(_) => ErrorKind::InternalServer,
            RedmineError::Protocol { .. } => ErrorKind::Protocol,
            RedmineError::UnregisteredKind(_)
            | RedmineError::MissingParameter(_)
            | RedmineError::InvalidConfig(_) => ErrorKind::Configuration,
            RedmineError::Serialization(_) | RedmineError::Deserialization(_) => {
                ErrorKind::Serialization
            }
        }
    }

    /// The HTTP status this error was translated from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RedmineError::NotFound(_) => Some(404),
            RedmineError::Unauthorized(_) => Some(401),
            RedmineError::Forbidden(_) => Some(403),
            RedmineError::Conflict => Some(409),
            RedmineError::Validation { .. } => Some(422),
            RedmineError::NotAcceptable(_) => Some(406),
            RedmineError::InternalServer(_) => Some(500),
            RedmineError::Protocol { status, .. } => *status,
            _ => None,
        }
    }
}

pub(crate) fn deserialization(message: impl std::fmt::Display) -> RedmineError {
    RedmineError::Deserialization(message.to_string())
}

pub(crate) fn serialization(message: impl std::fmt::Display) -> RedmineError {
    RedmineError::Serialization(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_joins_messages_with_newlines() {
        let err = RedmineError::Validation {
            operation: "POST".to_string(),
            messages: vec!["Name can't be blank".to_string(), "Name is too long".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("POST has invalid or missing attribute parameters: "));
        assert!(msg.ends_with("Name can't be blank\nName is too long"));
    }

    #[test]
    fn missing_parameter_names_the_parameter() {
        let err = RedmineError::MissingParameter("project_id");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("project_id"));
    }

    #[test]
    fn protocol_display_distinguishes_transport_failures() {
        let http = RedmineError::Protocol { status: Some(502), message: "Bad Gateway".into() };
        let io = RedmineError::Protocol { status: None, message: "connection reset".into() };
        assert_eq!(http.to_string(), "HTTP 502: Bad Gateway");
        assert_eq!(io.to_string(), "transport error: connection reset");
        assert_eq!(http.status(), Some(502));
        assert_eq!(io.status(), None);
    }

    #[test]
    fn decode_and_encode_failures_share_a_kind() {
        assert_eq!(deserialization("x").kind(), ErrorKind::Serialization);
        assert_eq!(serialization("x").kind(), ErrorKind::Serialization);
    }
}
