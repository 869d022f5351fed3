use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing::{info, warn};

use super::error::StudioError;
use super::operation::{OperationKind, OperationState, OperationTracker};
use super::request::{
    preview_text, speech_prompt, truncate_chars, ContentType, GenerationRequest, MAX_SPEECH_CHARS,
};
use crate::ai::gemini::{DEFAULT_SCRIPT_MODEL, DEFAULT_SPEECH_MODEL};
use crate::ai::{AiError, AiProvider, SamplingParams, TextRequest};
use crate::audio::{wav, AudioOutput, DecodedAudio, PlaybackController};
use crate::voice::{resolve_voice, SpeechRequest, TextToSpeech, DEFAULT_VOICE};

/// Models and limits used by a studio session
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub script_model: String,
    pub sampling: SamplingParams,
    pub speech_model: String,
    pub default_voice: String,
    pub max_speech_chars: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            script_model: DEFAULT_SCRIPT_MODEL.to_string(),
            sampling: SamplingParams::default(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            default_voice: DEFAULT_VOICE.to_string(),
            max_speech_chars: MAX_SPEECH_CHARS,
        }
    }
}

struct Workspace {
    request: GenerationRequest,
    script: String,
    voice: &'static str,
    audio: Option<Arc<DecodedAudio>>,
}

/// One user's session: inputs, the current script, the selected voice and
/// the last synthesized narration.
///
/// Every method takes `&self`; state lives behind short-lived locks that are
/// never held across a network call, so concurrent submissions of the same
/// operation are observed and rejected as [`StudioError::Busy`].
pub struct Studio {
    text_provider: Arc<dyn AiProvider>,
    speech_provider: Arc<dyn TextToSpeech>,
    playback: PlaybackController,
    operations: OperationTracker,
    config: StudioConfig,
    workspace: Mutex<Workspace>,
}

impl Studio {
    pub fn new(
        text_provider: Arc<dyn AiProvider>,
        speech_provider: Arc<dyn TextToSpeech>,
        output: Arc<dyn AudioOutput>,
        config: StudioConfig,
    ) -> Self {
        let voice = resolve_voice(&config.default_voice);
        Self {
            text_provider,
            speech_provider,
            playback: PlaybackController::new(output),
            operations: OperationTracker::new(),
            config,
            workspace: Mutex::new(Workspace {
                request: GenerationRequest::default(),
                script: String::new(),
                voice,
                audio: None,
            }),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn request(&self) -> GenerationRequest {
        self.workspace.lock().unwrap().request.clone()
    }

    pub fn update_request<F>(&self, updater: F)
    where
        F: FnOnce(&mut GenerationRequest),
    {
        updater(&mut self.workspace.lock().unwrap().request);
    }

    pub fn set_content_type(&self, content_type: ContentType) {
        self.update_request(|r| r.content_type = content_type);
    }

    pub fn script(&self) -> String {
        self.workspace.lock().unwrap().script.clone()
    }

    /// Replace the script with a user edit
    pub fn set_script(&self, script: impl Into<String>) {
        self.workspace.lock().unwrap().script = script.into();
    }

    pub fn voice(&self) -> &'static str {
        self.workspace.lock().unwrap().voice
    }

    /// Select a voice for narration. Unsupported names fall back to the
    /// default voice; the voice actually selected is returned.
    pub fn select_voice(&self, name: &str) -> &'static str {
        let voice = resolve_voice(name);
        self.workspace.lock().unwrap().voice = voice;
        voice
    }

    /// The last narration synthesized from the script
    pub fn audio(&self) -> Option<Arc<DecodedAudio>> {
        self.workspace.lock().unwrap().audio.clone()
    }

    pub fn operation_state(&self, kind: OperationKind) -> OperationState {
        self.operations.state(kind)
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn stop_playback(&self) {
        self.playback.stop();
    }

    /// Replay the stored narration
    pub fn play_audio(&self) -> Result<(), StudioError> {
        let audio = self
            .audio()
            .ok_or_else(|| StudioError::validation("No audio has been generated yet"))?;
        self.playback.play(audio).map_err(StudioError::Playback)
    }

    /// Ask the text provider for a script built from the current inputs.
    /// On success the script replaces the current one; on failure it is kept.
    pub async fn generate_script(&self) -> Result<String, StudioError> {
        let request = self.request();
        if !request.has_input() {
            return Err(StudioError::validation(
                "Fill in at least one input (theme, news or reference text)",
            ));
        }

        let op = self.operations.begin(OperationKind::Script)?;
        info!(
            content_type = %request.content_type,
            provider = self.text_provider.name(),
            "Generating script"
        );

        let text_request = TextRequest {
            model: self.config.script_model.clone(),
            prompt: request.build_prompt(),
            sampling: self.config.sampling,
        };
        let result = match self.text_provider.generate_text(text_request).await {
            Ok(text) if text.trim().is_empty() => Err(StudioError::Generation(
                AiError::Terminal(anyhow::anyhow!("Provider returned an empty script")),
            )),
            Ok(text) => Ok(text),
            Err(e) => Err(StudioError::Generation(e)),
        };

        let script = op.finish(result)?;
        self.set_script(script.clone());
        Ok(script)
    }

    /// Narrate the current script with the selected voice, store the audio
    /// and start playing it. Playback problems are reported after the audio
    /// has been stored.
    pub async fn generate_audio(&self) -> Result<Arc<DecodedAudio>, StudioError> {
        let audio = self.narrate().await?;
        self.playback
            .play(audio.clone())
            .map_err(StudioError::Playback)?;
        Ok(audio)
    }

    /// Narrate the current script and store the audio without playing it
    pub async fn narrate(&self) -> Result<Arc<DecodedAudio>, StudioError> {
        let (script, voice) = {
            let workspace = self.workspace.lock().unwrap();
            (workspace.script.clone(), workspace.voice)
        };
        if script.trim().is_empty() {
            return Err(StudioError::validation("There is no script to narrate"));
        }

        let op = self.operations.begin(OperationKind::Audio)?;
        let text = truncate_chars(&script, self.config.max_speech_chars);
        if text.len() < script.len() {
            info!(
                max_chars = self.config.max_speech_chars,
                "Script truncated for narration"
            );
        }

        let result = self.synthesize(text, voice).await;
        let audio = Arc::new(op.finish(result)?);
        self.workspace.lock().unwrap().audio = Some(audio.clone());
        Ok(audio)
    }

    /// Audition a voice with a fixed greeting. The stored narration is left
    /// untouched.
    pub async fn preview_voice(&self, name: &str) -> Result<Arc<DecodedAudio>, StudioError> {
        let op = self.operations.begin(OperationKind::Preview)?;
        let voice = resolve_voice(name);
        let result = self.synthesize(&preview_text(voice), voice).await;
        let audio = Arc::new(op.finish(result)?);

        self.playback
            .play(audio.clone())
            .map_err(StudioError::Playback)?;
        Ok(audio)
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<DecodedAudio, StudioError> {
        let request = SpeechRequest {
            model: self.config.speech_model.clone(),
            text: speech_prompt(text),
            voice: resolve_voice(voice).to_string(),
        };
        info!(voice = %request.voice, chars = text.chars().count(), "Synthesizing speech");

        let speech = self
            .speech_provider
            .synthesize(request)
            .await
            .map_err(StudioError::AudioGeneration)?;

        let audio = speech.decode().map_err(|e| {
            warn!(error = %e, "Speech payload could not be decoded");
            StudioError::AudioGeneration(AiError::Terminal(e.into()))
        })?;
        if audio.is_empty() {
            return Err(StudioError::AudioGeneration(AiError::Terminal(
                anyhow::anyhow!("Provider returned no audio frames"),
            )));
        }
        Ok(audio)
    }

    /// Write the script to `dir/roteiro-{type}.txt`, returning the path
    pub fn export_script(&self, dir: &Path) -> Result<PathBuf, StudioError> {
        let (script, content_type) = {
            let workspace = self.workspace.lock().unwrap();
            (workspace.script.clone(), workspace.request.content_type)
        };
        if script.trim().is_empty() {
            return Err(StudioError::validation("There is no script to export"));
        }

        let path = dir.join(content_type.script_file_name());
        std::fs::create_dir_all(dir)
            .and_then(|_| std::fs::write(&path, script))
            .with_context(|| format!("Failed to write {}", path.display()))
            .map_err(StudioError::Export)?;

        info!(path = %path.display(), "Script exported");
        Ok(path)
    }

    /// Write the stored narration to `path` as a 16-bit WAV file
    pub fn export_audio(&self, path: &Path) -> Result<(), StudioError> {
        let audio = self
            .audio()
            .ok_or_else(|| StudioError::validation("No audio has been generated yet"))?;
        wav::write_wav(&audio, path).map_err(StudioError::Export)?;
        info!(path = %path.display(), "Audio exported");
        Ok(())
    }
}
