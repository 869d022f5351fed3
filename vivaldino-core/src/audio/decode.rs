//! 16-bit PCM decoding into channel-separated float buffers

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

/// Sample rate of the speech payloads returned by the provider
pub const SPEECH_SAMPLE_RATE: u32 = 24000;

/// Channel count of the speech payloads returned by the provider
pub const SPEECH_CHANNELS: u16 = 1;

const I16_SCALE: f32 = 32768.0;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64 audio payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Decoded audio, one sample vector per channel, samples in [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Frame-major interleaved samples, as audio devices consume them
    pub fn interleaved(&self) -> Vec<f32> {
        let channels = self.channels.len();
        let mut out = Vec::with_capacity(self.frames() * channels);
        for i in 0..self.frames() {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }

    /// Average of all channels
    pub fn to_mono(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            n => (0..self.frames())
                .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() / n as f32)
                .collect(),
        }
    }
}

/// Decode interleaved signed 16-bit little-endian PCM.
///
/// The frame count is `pcm.len() / (2 * channels)`; trailing bytes that do not
/// form a complete frame are ignored. Sample `c` of frame `i` is
/// `int16[i * channels + c] / 32768.0`.
pub fn decode_pcm16(pcm: &[u8], sample_rate: u32, channels: u16) -> DecodedAudio {
    let channel_count = channels as usize;
    if channel_count == 0 {
        return DecodedAudio {
            channels: Vec::new(),
            sample_rate,
        };
    }

    let frame_count = pcm.len() / (2 * channel_count);
    let mut out = vec![Vec::with_capacity(frame_count); channel_count];

    for frame in pcm.chunks_exact(2 * channel_count).take(frame_count) {
        for (channel, bytes) in out.iter_mut().zip(frame.chunks_exact(2)) {
            let sample = i16::from_le_bytes([bytes[0], bytes[1]]);
            channel.push(sample as f32 / I16_SCALE);
        }
    }

    DecodedAudio {
        channels: out,
        sample_rate,
    }
}

/// Decode a base64 payload holding 16-bit PCM
pub fn decode_base64_pcm16(
    payload: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<DecodedAudio, DecodeError> {
    let bytes = general_purpose::STANDARD.decode(payload.trim())?;
    Ok(decode_pcm16(&bytes, sample_rate, channels))
}

/// Inverse of [`decode_pcm16`]: quantize to interleaved 16-bit little-endian PCM
pub fn encode_pcm16(audio: &DecodedAudio) -> Vec<u8> {
    audio
        .interleaved()
        .into_iter()
        .flat_map(|sample| quantize(sample).to_le_bytes())
        .collect()
}

pub(crate) fn quantize(sample: f32) -> i16 {
    (sample * I16_SCALE).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
