//! Default-device output using cpal
//! Resamples from the source rate to the device rate when they differ

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, error};

use super::controller::{AudioOutput, CompletionCallback, PlaybackHandle};
use super::decode::DecodedAudio;

/// Plays on the host's default output device.
///
/// cpal streams cannot move between threads, so each session owns a thread
/// that builds the stream and keeps it alive until the handle is dropped.
pub struct CpalOutput;

impl CpalOutput {
    /// Fails when the host has no default output device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no output device available")?;
        debug!(device = ?device.name().ok(), "Using default output device");
        Ok(Self)
    }
}

/// Dropping the handle closes the stop channel, which ends the stream thread
struct CpalPlayback {
    _stop: mpsc::Sender<()>,
}

impl PlaybackHandle for CpalPlayback {}

impl AudioOutput for CpalOutput {
    fn start(
        &self,
        audio: Arc<DecodedAudio>,
        on_finished: CompletionCallback,
    ) -> Result<Box<dyn PlaybackHandle>> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);

        thread::Builder::new()
            .name("vivaldino-playback".into())
            .spawn(move || {
                let stream = match open_stream(&audio, on_finished) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                // Blocks until the handle (and its sender) is dropped
                let _ = stop_rx.recv();
                drop(stream);
            })
            .context("failed to spawn playback thread")?;

        ready_rx
            .recv()
            .context("playback thread exited before starting")??;

        Ok(Box::new(CpalPlayback { _stop: stop_tx }))
    }
}

fn open_stream(audio: &DecodedAudio, on_finished: CompletionCallback) -> Result<Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no output device available")?;
    let supported_config = device
        .default_output_config()
        .context("failed to get default output config")?;

    let native_rate = supported_config.sample_rate().0;
    let native_channels = supported_config.channels() as usize;
    let sample_format = supported_config.sample_format();
    let config: StreamConfig = supported_config.into();

    let mono = audio.to_mono();
    let resampled = if audio.sample_rate == native_rate {
        mono
    } else {
        resample(&mono, audio.sample_rate, native_rate)?
    };
    let samples = Arc::new(expand_to_channels(&resampled, native_channels));

    let on_finished = Arc::new(Mutex::new(Some(on_finished)));
    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, samples, on_finished)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, samples, on_finished)?,
        format => anyhow::bail!("unsupported sample format: {:?}", format),
    };

    stream.play().context("failed to start playback stream")?;
    Ok(stream)
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Vec<f32>>,
    on_finished: Arc<Mutex<Option<CompletionCallback>>>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32> + Default + Send + 'static,
{
    let position = AtomicUsize::new(0);
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let pos = position.load(Ordering::SeqCst);
                let remaining = samples.len().saturating_sub(pos);

                if remaining == 0 {
                    data.fill(T::default());
                    // Taken on the first silent buffer, so it runs once
                    let callback = on_finished.lock().ok().and_then(|mut c| c.take());
                    if let Some(callback) = callback {
                        callback();
                    }
                    return;
                }

                let to_copy = remaining.min(data.len());
                for (i, &sample) in samples[pos..pos + to_copy].iter().enumerate() {
                    data[i] = T::from_sample(sample);
                }

                if to_copy < data.len() {
                    data[to_copy..].fill(T::default());
                }

                position.store(pos + to_copy, Ordering::SeqCst);
            },
            move |err| {
                error!(error = ?err, "playback stream error");
            },
            None,
        )
        .context("failed to build output stream")
}

fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    let chunk_size = 1024;
    let mut resampler =
        FftFixedIn::<f32>::new(source_rate as usize, target_rate as usize, chunk_size, 2, 1)
            .context("failed to create resampler")?;

    let mut output = Vec::new();
    let mut pos = 0;

    while pos < samples.len() {
        let frames_needed = resampler.input_frames_next();
        let end = (pos + frames_needed).min(samples.len());

        let mut input_chunk = samples[pos..end].to_vec();
        if input_chunk.len() < frames_needed {
            input_chunk.resize(frames_needed, 0.0);
        }

        let input = vec![input_chunk];
        let resampled = resampler
            .process(&input, None)
            .map_err(|e| anyhow::anyhow!("resampling failed: {:?}", e))?;
        if let Some(chunk) = resampled.into_iter().next() {
            output.extend(chunk);
        }

        pos = end;
    }

    Ok(output)
}

fn expand_to_channels(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .iter()
        .flat_map(|&sample| std::iter::repeat(sample).take(channels))
        .collect()
}
