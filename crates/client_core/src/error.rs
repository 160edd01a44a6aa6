use shared::{domain::DescriptionId, error::ServerErrorPayload};
use thiserror::Error;

pub const UNREACHABLE_MESSAGE: &str =
    "The request failed for unknown reason. Is the application online?";
pub const REQUEST_FAILED_MESSAGE: &str = "The request failed.";

/// A failed repository call, decoded once at the transport boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestFailure {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("request did not reach the repository: {0}")]
    Transport(String),
    /// The repository answered with a non-success status.
    #[error("repository replied with status {status}")]
    Status {
        status: u16,
        body: Option<ServerErrorPayload>,
    },
    /// The repository answered successfully but the body was not understood.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RequestFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&ServerErrorPayload> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Request(#[from] RequestFailure),
    #[error("device description {0} is not in the local list")]
    UnknownDescription(DescriptionId),
}

impl ClientError {
    pub fn request_failure(&self) -> Option<&RequestFailure> {
        match self {
            Self::Request(failure) => Some(failure),
            Self::UnknownDescription(_) => None,
        }
    }
}

/// What the user gets to see about a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFailure {
    pub message: String,
    pub detail_messages: Option<Vec<String>>,
}

/// Maps a failure onto the single message shown to the user plus any
/// field-level detail messages the server attached.
pub fn normalize_failure(failure: &RequestFailure) -> NormalizedFailure {
    match failure {
        RequestFailure::Decode(_) => NormalizedFailure {
            message: REQUEST_FAILED_MESSAGE.to_string(),
            detail_messages: None,
        },
        RequestFailure::Transport(_) | RequestFailure::Status { body: None, .. } => {
            NormalizedFailure {
                message: UNREACHABLE_MESSAGE.to_string(),
                detail_messages: None,
            }
        }
        RequestFailure::Status {
            body: Some(payload),
            ..
        } => NormalizedFailure {
            message: payload
                .display_message()
                .unwrap_or(REQUEST_FAILED_MESSAGE)
                .to_string(),
            detail_messages: payload.detail_messages.clone(),
        },
    }
}
