//! Orchestration of script generation, narration and export

pub mod error;
pub mod operation;
pub mod request;
pub mod session;

pub use error::StudioError;
pub use operation::{OperationKind, OperationState};
pub use request::{ContentType, GenerationRequest, MAX_SPEECH_CHARS};
pub use session::{Studio, StudioConfig};
