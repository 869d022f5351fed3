//! Audio decoding, playback ownership and export

pub mod controller;
pub mod decode;
#[cfg(feature = "voice")]
pub mod playback;
pub mod wav;

use std::sync::Arc;

use anyhow::Result;

pub use controller::{AudioOutput, PlaybackController, PlaybackHandle, PlaybackState};
pub use decode::{decode_base64_pcm16, decode_pcm16, encode_pcm16, DecodeError, DecodedAudio};

/// Output used when the crate is built without device support
pub struct UnavailableOutput;

impl AudioOutput for UnavailableOutput {
    fn start(
        &self,
        _audio: Arc<DecodedAudio>,
        _on_finished: controller::CompletionCallback,
    ) -> Result<Box<dyn PlaybackHandle>> {
        anyhow::bail!(
            "audio playback is unavailable (no output device, or built without the `voice` feature)"
        )
    }
}

/// The default output device, or [`UnavailableOutput`] when there is none
pub fn default_output() -> Arc<dyn AudioOutput> {
    #[cfg(feature = "voice")]
    {
        match playback::CpalOutput::new() {
            Ok(output) => return Arc::new(output),
            Err(e) => tracing::warn!(error = ?e, "No audio output device, playback disabled"),
        }
    }
    Arc::new(UnavailableOutput)
}
