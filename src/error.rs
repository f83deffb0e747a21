//! Error types for voicegram.

use crate::flow::{CallEvent, CallState};

/// Top-level error type for the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Call flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Call error: {0}")]
    Call(#[from] CallError),
}

/// Configuration-related errors. All of these are fatal at startup; the
/// process must not begin accepting webhooks with a broken script.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read script file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse script file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid script value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

/// A callback event the current call state cannot accept.
///
/// The state machine surfaces this instead of guessing; the webhook layer
/// recovers by replaying the current state's document so a misbehaving
/// platform integration never drops a live call.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{event} cannot be handled in the {state} state")]
    UnexpectedEvent { state: CallState, event: CallEvent },
}

/// Errors talking to the Twilio REST API when placing the outbound call.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("Call creation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Twilio rejected call creation: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed call creation response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for the orchestrator.
pub type Result<T> = std::result::Result<T, Error>;
