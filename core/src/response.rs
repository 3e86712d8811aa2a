//! Transport outcome to payload or typed error.
//!
//! # Design
//! Classification happens in one place, [`ResponseTranslator::check`], so
//! every operation maps statuses identically. Only 2xx bodies reach the
//! entity decoders; a decode failure on a 2xx stays a serialization error
//! and is never reclassified as an HTTP failure.

use tracing::{debug, warn};

use crate::error::{RedmineError, RedmineResult};
use crate::format::MimeFormat;
use crate::http::{HttpMethod, HttpResponse, TransportError, TransportOutcome};
use crate::serialization::{self, Entity, PagedList};
use crate::types::ErrorRecord;

#[derive(Debug, Clone, Copy)]
pub struct ResponseTranslator {
    format: MimeFormat,
}

impl ResponseTranslator {
    pub fn new(format: MimeFormat) -> Self {
        Self { format }
    }

    /// Passes 2xx responses through and turns everything else into an error.
    /// `operation` names the request in validation errors.
    pub fn check(&self, outcome: TransportOutcome, operation: HttpMethod) -> RedmineResult<HttpResponse> {
        let response = match outcome {
            Ok(response) => response,
            Err(failure) => {
                warn!(%operation, ?failure, "transport failure");
                return Err(match failure {
                    TransportError::Timeout(message) => RedmineError::Timeout(message),
                    TransportError::NameResolution(message) => RedmineError::NameResolution(message),
                    TransportError::Other(message) => RedmineError::Protocol { status: None, message },
                });
            }
        };

        if response.is_success() {
            debug!(%operation, status = response.status, "request succeeded");
            return Ok(response);
        }

        let status = response.status;
        let error = match status {
            401 => RedmineError::Unauthorized(describe(&response)),
            403 => RedmineError::Forbidden(describe(&response)),
            404 => RedmineError::NotFound(describe(&response)),
            406 => RedmineError::NotAcceptable(describe(&response)),
            409 => RedmineError::Conflict,
            422 => RedmineError::Validation {
                operation: operation.to_string(),
                messages: self.validation_messages(&response.body),
            },
            500 => RedmineError::InternalServer(describe(&response)),
            _ => RedmineError::Protocol {
                status: Some(status),
                message: describe(&response),
            },
        };
        warn!(%operation, status, error = %error, "request failed");
        Err(error)
    }

    pub fn translate<T: Entity>(&self, outcome: TransportOutcome, operation: HttpMethod) -> RedmineResult<T> {
        let response = self.check(outcome, operation)?;
        serialization::decode(&response.body, self.format)
    }

    pub fn translate_list<T: Entity>(
        &self,
        outcome: TransportOutcome,
        operation: HttpMethod,
    ) -> RedmineResult<PagedList<T>> {
        let response = self.check(outcome, operation)?;
        serialization::decode_list(&response.body, self.format)
    }

    /// For operations that answer with no useful body (update, delete, …).
    pub fn translate_empty(&self, outcome: TransportOutcome, operation: HttpMethod) -> RedmineResult<()> {
        self.check(outcome, operation).map(|_| ())
    }

    /// Like [`translate`](Self::translate), but a blank 2xx body is `None`.
    pub fn translate_optional<T: Entity>(
        &self,
        outcome: TransportOutcome,
        operation: HttpMethod,
    ) -> RedmineResult<Option<T>> {
        let response = self.check(outcome, operation)?;
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        serialization::decode(&response.body, self.format).map(Some)
    }

    fn validation_messages(&self, body: &str) -> Vec<String> {
        if body.trim().is_empty() {
            return Vec::new();
        }
        match serialization::decode_list::<ErrorRecord>(body, self.format) {
            Ok(page) => page.items.into_iter().map(|record| record.info).collect(),
            Err(err) => {
                warn!(error = %err, "unreadable validation payload");
                Vec::new()
            }
        }
    }
}

fn describe(response: &HttpResponse) -> String {
    if response.reason.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        response.reason.clone()
    }
}
