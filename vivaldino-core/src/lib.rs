pub mod ai;
pub mod audio;
pub mod settings;
pub mod studio;
pub mod voice;

pub use ai::{AiError, AiProvider};
pub use audio::{DecodedAudio, PlaybackController};
pub use settings::{Settings, SettingsManager};
pub use studio::{ContentType, GenerationRequest, Studio, StudioConfig, StudioError};
pub use voice::TextToSpeech;
