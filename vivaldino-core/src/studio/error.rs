use thiserror::Error;

use super::operation::OperationKind;
use crate::ai::AiError;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("{0}")]
    Validation(String),

    #[error("A {0} request is already in progress")]
    Busy(OperationKind),

    #[error("Script generation failed: {0}")]
    Generation(AiError),

    #[error("Audio generation failed: {0}")]
    AudioGeneration(AiError),

    #[error("Export failed: {0:#}")]
    Export(anyhow::Error),

    #[error("Playback failed: {0:#}")]
    Playback(anyhow::Error),
}

impl StudioError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
