use async_trait::async_trait;

use crate::ai::AiError;
use crate::audio::decode::{decode_base64_pcm16, DecodeError, DecodedAudio};

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub model: String,
    pub text: String,
    /// Provider voice id, already resolved against the voice table
    pub voice: String,
}

/// Audio returned from synthesis: base64 PCM16 plus its format
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub data: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SpeechAudio {
    pub fn decode(&self) -> Result<DecodedAudio, DecodeError> {
        decode_base64_pcm16(&self.data, self.sample_rate, self.channels)
    }
}

/// Trait for text-to-speech providers
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, AiError>;
}
