pub mod catalog;
pub mod tts;

pub use catalog::{resolve_voice, Gender, VoiceProfile, CATALOG, DEFAULT_VOICE, SUPPORTED_VOICES};
pub use tts::{SpeechAudio, SpeechRequest, TextToSpeech};
