//! Single-slot playback ownership: at most one session plays at a time.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info};

use super::decode::DecodedAudio;

/// Invoked once, from the output's own thread, when a session reaches the end
/// of its audio.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// A running playback session. Dropping the handle halts the session.
pub trait PlaybackHandle: Send {}

/// Something that can render decoded audio, e.g. the default output device
pub trait AudioOutput: Send + Sync {
    fn start(
        &self,
        audio: Arc<DecodedAudio>,
        on_finished: CompletionCallback,
    ) -> Result<Box<dyn PlaybackHandle>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

struct Slot {
    /// Bumped on every play/stop so completions of replaced sessions are ignored
    generation: u64,
    session: Option<Box<dyn PlaybackHandle>>,
    playing: bool,
}

/// Owns the single playback slot. `play` replaces, `stop` releases.
pub struct PlaybackController {
    output: Arc<dyn AudioOutput>,
    slot: Arc<Mutex<Slot>>,
    playing_tx: Arc<watch::Sender<bool>>,
}

impl PlaybackController {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        let (playing_tx, _) = watch::channel(false);
        Self {
            output,
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                session: None,
                playing: false,
            })),
            playing_tx: Arc::new(playing_tx),
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.slot.lock().unwrap().playing
    }

    /// Receiver that observes the "is playing" signal
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.playing_tx.subscribe()
    }

    /// Stop whatever is playing, then start `audio`. Never queues.
    pub fn play(&self, audio: Arc<DecodedAudio>) -> Result<()> {
        let (previous, generation) = {
            let mut slot = self.slot.lock().unwrap();
            slot.generation += 1;
            slot.playing = true;
            (slot.session.take(), slot.generation)
        };

        // Halted outside the lock: the output thread may be waiting on it
        if let Some(previous) = previous {
            debug!(generation, "Preempting active playback session");
            drop(previous);
        }
        self.playing_tx.send_replace(true);

        let on_finished = self.completion_callback(generation);
        let frames = audio.frames();
        let handle = match self.output.start(audio, on_finished) {
            Ok(handle) => handle,
            Err(e) => {
                let mut slot = self.slot.lock().unwrap();
                if slot.generation == generation {
                    slot.playing = false;
                    self.playing_tx.send_replace(false);
                }
                return Err(e);
            }
        };

        let mut slot = self.slot.lock().unwrap();
        if slot.generation == generation {
            slot.session = Some(handle);
            info!(generation, frames, "Playback started");
        } else {
            // Another play/stop won the race; this session must not survive it
            drop(slot);
            drop(handle);
        }
        Ok(())
    }

    /// Halt the active session. A no-op when idle.
    pub fn stop(&self) {
        let (session, was_playing) = {
            let mut slot = self.slot.lock().unwrap();
            let was_playing = slot.playing;
            if was_playing || slot.session.is_some() {
                slot.generation += 1;
            }
            slot.playing = false;
            (slot.session.take(), was_playing)
        };

        drop(session);
        if was_playing {
            info!("Playback stopped");
            self.playing_tx.send_replace(false);
        }
    }

    /// Resolves once the slot is idle
    pub async fn wait_until_idle(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|playing| !*playing).await;
    }

    fn completion_callback(&self, generation: u64) -> CompletionCallback {
        let slot = Arc::clone(&self.slot);
        let playing_tx = Arc::clone(&self.playing_tx);
        Box::new(move || {
            let mut slot = slot.lock().unwrap();
            if slot.generation != generation || !slot.playing {
                return;
            }
            // The handle stays in the slot; it is released from the control side
            slot.playing = false;
            playing_tx.send_replace(false);
            debug!(generation, "Playback finished");
        })
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}
