//! WAV export of decoded audio

use std::path::Path;

use anyhow::{Context, Result};

use super::decode::{quantize, DecodedAudio};

/// Write `audio` as a 16-bit integer WAV file, creating parent directories
pub fn write_wav(audio: &DecodedAudio, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let spec = hound::WavSpec {
        channels: audio.channel_count().max(1),
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file {}", path.display()))?;
    for sample in audio.interleaved() {
        writer
            .write_sample(quantize(sample))
            .context("Failed to write WAV sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}
