//! Error handling for the Stockroom client
//!
//! Every failure an orchestrator can report, with a stable code and the
//! message shown to the operator.

use std::collections::BTreeMap;

use serde::Deserialize;
use shared::workflow::{CartError, ReceiptError, RecoveryError, RowError, SubmitBlocker, WizardError};
use thiserror::Error;

/// Toast text when the server gives no usable message
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    // Raised before any request is sent
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Submission blocked: {}", join_blockers(.0))]
    Blocked(Vec<SubmitBlocker>),

    #[error("{} row error(s) in the uploaded sheet", .0.len())]
    RowErrors(Vec<RowError>),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Server rejections
    #[error("Server error ({status}): {}", message.as_deref().unwrap_or(FALLBACK_MESSAGE))]
    Server {
        status: u16,
        message: Option<String>,
        field_errors: BTreeMap<String, Vec<String>>,
    },

    // Transport
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    // Local resources
    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn join_blockers(blockers: &[SubmitBlocker]) -> String {
    blockers
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Body of a rejected request
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ClientError {
    /// Build a server rejection from its status and raw body
    pub fn from_server(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let (message, field_errors) = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(text)) => (Some(text), BTreeMap::new()),
            Ok(value @ serde_json::Value::Object(_)) => {
                let parsed: ServerErrorBody = serde_json::from_value(value).unwrap_or_default();
                (parsed.message, parsed.errors.unwrap_or_default())
            }
            Ok(_) => (None, BTreeMap::new()),
            Err(_) if trimmed.is_empty() => (None, BTreeMap::new()),
            Err(_) => (Some(trimmed.to_string()), BTreeMap::new()),
        };

        ClientError::Server {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
            field_errors,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::Blocked(_) => "SUBMISSION_BLOCKED",
            ClientError::RowErrors(_) => "ROW_ERRORS",
            ClientError::SubmissionInFlight => "SUBMISSION_IN_FLIGHT",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::Server { .. } => "SERVER_REJECTED",
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Session(_) => "SESSION_ERROR",
            ClientError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Text for the operator's toast
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Blocked(blockers) => join_blockers(blockers),
            ClientError::RowErrors(errors) => match errors.first() {
                Some(first) if errors.len() == 1 => first.to_string(),
                Some(first) => format!("{} (and {} more)", first, errors.len() - 1),
                None => "The uploaded sheet has errors".to_string(),
            },
            ClientError::SubmissionInFlight => {
                "Please wait for the current submission to finish".to_string()
            }
            ClientError::NotFound(resource) => format!("{} not found", resource),
            ClientError::Server {
                message,
                field_errors,
                ..
            } => {
                let base = message.clone().unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
                if field_errors.is_empty() {
                    return base;
                }
                let details: Vec<String> = field_errors
                    .iter()
                    .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
                    .collect();
                format!("{} ({})", base, details.join("; "))
            }
            ClientError::Network(_) | ClientError::Decode(_) => FALLBACK_MESSAGE.to_string(),
            ClientError::Session(_) | ClientError::Configuration(_) => self.to_string(),
        }
    }

    /// Raised locally, before any request
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_)
                | ClientError::Blocked(_)
                | ClientError::RowErrors(_)
                | ClientError::SubmissionInFlight
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Configuration(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<CartError> for ClientError {
    fn from(err: CartError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<ReceiptError> for ClientError {
    fn from(err: ReceiptError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<RecoveryError> for ClientError {
    fn from(err: RecoveryError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<WizardError> for ClientError {
    fn from(err: WizardError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<Vec<SubmitBlocker>> for ClientError {
    fn from(blockers: Vec<SubmitBlocker>) -> Self {
        ClientError::Blocked(blockers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_verbatim() {
        let err = ClientError::from_server(
            400,
            r#"{"message":"Insufficient stock for Paper Bags","errors":{"items[0].quantity":["Must be positive"]}}"#,
        );
        assert_eq!(err.code(), "SERVER_REJECTED");
        assert_eq!(
            err.user_message(),
            "Insufficient stock for Paper Bags (items[0].quantity: Must be positive)"
        );
    }

    #[test]
    fn test_missing_message_uses_fallback() {
        let err = ClientError::from_server(500, "");
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
        let err = ClientError::from_server(500, r#"{"title":"oops"}"#);
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_plain_text_and_json_string_bodies() {
        let err = ClientError::from_server(400, "Transfer already received");
        assert_eq!(err.user_message(), "Transfer already received");
        let err = ClientError::from_server(400, r#""Serial SC-1 is not available""#);
        assert_eq!(err.user_message(), "Serial SC-1 is not available");
    }

    #[test]
    fn test_blocked_lists_every_reason() {
        let err = ClientError::Blocked(vec![SubmitBlocker::SourceUnset, SubmitBlocker::EmptyCart]);
        assert!(err.is_client_side());
        assert_eq!(
            err.user_message(),
            "Select a source location; Add at least one product"
        );
    }

    #[test]
    fn test_network_errors_are_generic() {
        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
        assert!(!err.is_client_side());
    }
}
