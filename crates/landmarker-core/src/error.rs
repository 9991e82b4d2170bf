//! Error type for precondition violations surfaced by the engine.
//!
//! Geometric dead ends (a drag that would leave the surface, a press that
//! matches nothing) are not errors and never show up here.

/// Errors returned by session, model and config operations.
#[derive(Debug, thiserror::Error)]
pub enum LandmarkerError {
    #[error("Asset index {index} out of range (0..{count})")]
    AssetIndexOutOfRange { index: usize, count: usize },
    #[error("No landmark group is bound")]
    NoLandmarks,
    #[error("Landmark index {index} out of range for a group of {count}")]
    LandmarkIndexOutOfRange { index: usize, count: usize },
    #[error("Malformed landmark group: {0}")]
    MalformedGroup(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = LandmarkerError> = std::result::Result<T, E>;
