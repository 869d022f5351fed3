use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::ai::{error::AiError, provider::AiProvider, types::TextRequest};
use crate::audio::decode::{SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};
use crate::voice::tts::{SpeechAudio, SpeechRequest, TextToSpeech};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SCRIPT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Environment variables consulted, in order, when no key is configured
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Pick the configured key, else the first non-empty environment variable.
/// An empty result is allowed; the remote side rejects it.
pub fn resolve_api_key(configured: Option<&str>) -> String {
    if let Some(key) = configured.filter(|k| !k.trim().is_empty()) {
        return key.trim().to_string();
    }
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Client for the Gemini `generateContent` endpoint, used for both script
/// text and speech synthesis
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AiError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        debug!(%url, "Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                debug!(?e, "Gemini API call failed");
                AiError::Retryable(anyhow::anyhow!("Network error: {}", e))
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AiError::Retryable(anyhow::anyhow!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            debug!(?status, ?response_text, "Gemini API returned error");
            let error = anyhow::anyhow!("Gemini API error {}: {}", status, response_text);
            return Err(if is_retryable_status(status) {
                AiError::Retryable(error)
            } else {
                AiError::Terminal(error)
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            AiError::Terminal(anyhow::anyhow!(
                "Failed to parse Gemini response: {} - Response: {}",
                e,
                response_text
            ))
        })
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait::async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn generate_text(&self, request: TextRequest) -> Result<String, AiError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent::text(request.prompt)],
            generation_config: GenerationConfig {
                temperature: Some(request.sampling.temperature),
                top_k: Some(request.sampling.top_k),
                top_p: Some(request.sampling.top_p),
                ..Default::default()
            },
        };

        let response = self.generate_content(&request.model, &body).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(AiError::Terminal(anyhow::anyhow!(
                "Gemini returned no text{}",
                response.block_reason_suffix()
            )));
        }

        info!(model = %request.model, chars = text.chars().count(), "Script generated");
        Ok(text)
    }
}

#[async_trait::async_trait]
impl TextToSpeech for GeminiProvider {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, AiError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent::text(request.text)],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: request.voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            },
        };

        let response = self.generate_content(&request.model, &body).await?;
        let Some(inline) = response.inline_data() else {
            return Err(AiError::Terminal(anyhow::anyhow!(
                "Gemini returned no audio data{}",
                response.block_reason_suffix()
            )));
        };
        if inline.data.trim().is_empty() {
            return Err(AiError::Terminal(anyhow::anyhow!(
                "Gemini returned an empty audio payload"
            )));
        }

        // Speech is always decoded as 24 kHz mono; a payload declaring
        // anything else cannot be played back correctly
        if let Some(rate) = inline.mime_type.as_deref().and_then(sample_rate_from_mime) {
            if rate != SPEECH_SAMPLE_RATE {
                return Err(AiError::Terminal(anyhow::anyhow!(
                    "Gemini returned audio at {rate} Hz, expected {SPEECH_SAMPLE_RATE} Hz"
                )));
            }
        }

        info!(model = %request.model, voice = %request.voice, "Speech synthesized");

        Ok(SpeechAudio {
            data: inline.data.clone(),
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: SPEECH_CHANNELS,
        })
    }
}

/// Extract `rate=N` from a mime type like `audio/L16;codec=pcm;rate=24000`
fn sample_rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.trim().parse().ok())
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

impl RequestContent {
    fn text(text: String) -> Self {
        Self {
            parts: vec![RequestPart { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    fn inline_data(&self) -> Option<&InlineData> {
        self.first_parts().first()?.inline_data.as_ref()
    }

    fn block_reason_suffix(&self) -> String {
        let reason = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .or_else(|| {
                self.candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
            });
        match reason {
            Some(reason) => format!(" (reason: {reason})"),
            None => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
