use crate::ai::{error::AiError, provider::AiProvider, types::TextRequest};
use crate::audio::decode::{SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};
use crate::voice::tts::{SpeechAudio, SpeechRequest, TextToSpeech};
use base64::{engine::general_purpose, Engine as _};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

pub const MOCK_SCRIPT: &str = "Mock script response";

/// Frames of audio returned by a successful mock synthesis
pub const MOCK_AUDIO_FRAMES: usize = 2400;

/// Mock behavior for the mock provider
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MockBehavior {
    /// Return successful responses
    #[default]
    Success,
    /// Return the given script text
    Text { text: String },
    /// Always return a retryable error
    AlwaysRetryableError,
    /// Always return a non-retryable error
    AlwaysNonRetryableError,
    /// Succeed at the transport level but carry no text or audio
    EmptyResponse,
    /// Return an audio payload that is not valid base64
    InvalidAudio,
    /// Pops one behavior per call; falls back to Success once drained
    BehaviorQueue { behaviors: Vec<MockBehavior> },
}

/// Mock provider for testing and offline use. Serves both script text and
/// speech audio.
#[derive(Clone)]
pub struct MockProvider {
    behavior: Arc<Mutex<MockBehavior>>,
    call_count: Arc<Mutex<usize>>,
    captured_requests: Arc<Mutex<Vec<TextRequest>>>,
    captured_speech_requests: Arc<Mutex<Vec<SpeechRequest>>>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            call_count: Arc::new(Mutex::new(0)),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
            captured_speech_requests: Arc::new(Mutex::new(Vec::new())),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    fn pop_behavior_from_queue(behavior: &mut MockBehavior) -> MockBehavior {
        if let MockBehavior::BehaviorQueue { behaviors } = behavior {
            if behaviors.is_empty() {
                return MockBehavior::Success;
            }
            return behaviors.remove(0);
        }
        behavior.clone()
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Delay every response, so callers can observe in-flight state
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_captured_requests(&self) -> Vec<TextRequest> {
        self.captured_requests.lock().unwrap().clone()
    }

    pub fn get_last_captured_request(&self) -> Option<TextRequest> {
        self.captured_requests.lock().unwrap().last().cloned()
    }

    pub fn get_captured_speech_requests(&self) -> Vec<SpeechRequest> {
        self.captured_speech_requests.lock().unwrap().clone()
    }

    pub fn get_last_captured_speech_request(&self) -> Option<SpeechRequest> {
        self.captured_speech_requests.lock().unwrap().last().cloned()
    }

    /// Count the call, wait out the latency and pick the behavior for it
    async fn next_behavior(&self) -> MockBehavior {
        {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
        }

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut behavior = self.behavior.lock().unwrap();
        Self::pop_behavior_from_queue(&mut behavior)
    }

    /// Resolve error behaviors; `Ok(behavior)` means the call should succeed
    fn check_failure(behavior: MockBehavior) -> Result<MockBehavior, AiError> {
        match behavior {
            MockBehavior::AlwaysRetryableError => Err(AiError::Retryable(anyhow::anyhow!(
                "Mock retryable error (always fails)"
            ))),
            MockBehavior::AlwaysNonRetryableError => Err(AiError::Terminal(anyhow::anyhow!(
                "Mock non-retryable error"
            ))),
            other => Ok(other),
        }
    }
}

/// A quiet 440 Hz tone, encoded the way the speech endpoint returns audio
pub fn mock_speech_payload() -> String {
    let pcm: Vec<u8> = (0..MOCK_AUDIO_FRAMES)
        .map(|i| {
            let t = i as f32 / SPEECH_SAMPLE_RATE as f32;
            ((t * 440.0 * std::f32::consts::TAU).sin() * 4096.0) as i16
        })
        .flat_map(|sample| sample.to_le_bytes())
        .collect();
    general_purpose::STANDARD.encode(pcm)
}

#[async_trait::async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate_text(&self, request: TextRequest) -> Result<String, AiError> {
        self.captured_requests.lock().unwrap().push(request);

        let behavior = self.next_behavior().await;
        match Self::check_failure(behavior)? {
            MockBehavior::Text { text } => Ok(text),
            MockBehavior::EmptyResponse => Err(AiError::Terminal(anyhow::anyhow!(
                "Mock provider returned no text"
            ))),
            _ => Ok(MOCK_SCRIPT.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl TextToSpeech for MockProvider {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, AiError> {
        self.captured_speech_requests.lock().unwrap().push(request);

        let behavior = self.next_behavior().await;
        let data = match Self::check_failure(behavior)? {
            MockBehavior::EmptyResponse => {
                return Err(AiError::Terminal(anyhow::anyhow!(
                    "Mock provider returned no audio data"
                )))
            }
            MockBehavior::InvalidAudio => "%%% not audio %%%".to_string(),
            _ => mock_speech_payload(),
        };

        Ok(SpeechAudio {
            data,
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: SPEECH_CHANNELS,
        })
    }
}
