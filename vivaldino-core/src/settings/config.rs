use crate::ai::gemini::{DEFAULT_SCRIPT_MODEL, DEFAULT_SPEECH_MODEL};
use crate::ai::mock::MockBehavior;
use crate::ai::types::SamplingParams;
use crate::studio::request::MAX_SPEECH_CHARS;
use crate::studio::session::StudioConfig;
use crate::voice::catalog::DEFAULT_VOICE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const GEMINI_PROVIDER: &str = "gemini";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "gemini")]
    Gemini {
        /// Falls back to GEMINI_API_KEY / API_KEY when unset
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    #[serde(rename = "mock")]
    Mock {
        #[serde(default)]
        behavior: MockBehavior,
    },
}

/// Script generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_script_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: default_script_model(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
        }
    }
}

impl GenerationSettings {
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
        }
    }
}

/// Speech synthesis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    #[serde(default = "default_speech_model")]
    pub model: String,
    #[serde(default = "default_voice")]
    pub default_voice: String,
    /// Characters of script sent for narration
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            model: default_speech_model(),
            default_voice: default_voice(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_script_model() -> String {
    DEFAULT_SCRIPT_MODEL.to_string()
}

fn default_speech_model() -> String {
    DEFAULT_SPEECH_MODEL.to_string()
}

fn default_temperature() -> f32 {
    SamplingParams::default().temperature
}

fn default_top_k() -> u32 {
    SamplingParams::default().top_k
}

fn default_top_p() -> f32 {
    SamplingParams::default().top_p
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_max_chars() -> usize {
    MAX_SPEECH_CHARS
}

/// Core application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The name of the currently active provider
    #[serde(default)]
    pub active_provider: Option<String>,

    /// Directory scripts are exported to when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// Map of provider name to configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub speech: SpeechSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_provider: Some(GEMINI_PROVIDER.to_string()),
            providers: HashMap::from([(
                GEMINI_PROVIDER.to_string(),
                ProviderConfig::Gemini {
                    api_key: None,
                    base_url: None,
                },
            )]),
            generation: GenerationSettings::default(),
            speech: SpeechSettings::default(),
            export_dir: None,
        }
    }
}

impl Settings {
    pub fn active_provider_config(&self) -> Option<&ProviderConfig> {
        let name = self.active_provider.as_ref()?;
        self.providers.get(name)
    }

    pub fn studio_config(&self) -> StudioConfig {
        StudioConfig {
            script_model: self.generation.model.clone(),
            sampling: self.generation.sampling(),
            speech_model: self.speech.model.clone(),
            default_voice: self.speech.default_voice.clone(),
            max_speech_chars: self.speech.max_chars,
        }
    }

    /// Export directory, defaulting to the working directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
