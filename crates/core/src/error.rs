use thiserror::Error;

use crate::show::DotType;

/// Errors raised by the movement engine and the editing layer on top of it.
#[derive(Debug, Error)]
pub enum DrillError {
    #[error("No continuity of the type: {0}")]
    UnknownContinuityType(String),

    #[error("Ran out of movements for dot {dot}: {remaining} beats remaining at beat {beat}")]
    AnimationState {
        dot: usize,
        beat: f64,
        remaining: f64,
    },

    #[error("Action name in an invalid format: {0}")]
    InvalidAction(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Dot not found: {0}")]
    DotNotFound(usize),

    #[error("Song not found: {0}")]
    SongNotFound(String),

    #[error("No continuity at index {index} for dot type {dot_type}")]
    ContinuityNotFound { dot_type: DotType, index: usize },

    #[error("A two-step continuity cannot contain another two-step continuity")]
    NestedTwoStep,

    #[error("Invalid show document: {0}")]
    InvalidDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DrillError>;
