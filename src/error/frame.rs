//! Errors raised while turning a single frame into an event.
//!
//! A frame error never closes the stream: the parser logs it and drops the
//! frame.

use thiserror::Error;

use super::ErrorCategory;
use crate::sse::PartialJsonError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// The data lines were not JSON, even allowing for truncation.
    #[error("Invalid JSON in frame: {0}")]
    Json(#[from] PartialJsonError),

    /// The payload parsed but is not a JSON object.
    #[error("Frame payload is not an object")]
    NotAnObject,

    /// The payload has no string `event` key.
    #[error("Frame payload has no event tag")]
    MissingEventTag,

    /// The `data` object does not match the shape of its event.
    #[error("Invalid data for '{event}' event: {message}")]
    InvalidPayload { event: String, message: String },
}

impl FrameError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Protocol
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FrameError::Json(_) => "E_FRAME_JSON",
            FrameError::NotAnObject => "E_FRAME_SHAPE",
            FrameError::MissingEventTag => "E_FRAME_TAG",
            FrameError::InvalidPayload { .. } => "E_FRAME_PAYLOAD",
        }
    }
}
