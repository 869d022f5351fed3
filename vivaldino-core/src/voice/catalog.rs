//! Voice table and fallback policy for speech synthesis

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::debug;

/// Voice used whenever a requested voice is not supported
pub const DEFAULT_VOICE: &str = "Kore";

/// Voice ids the speech endpoint accepts, in canonical spelling
pub const SUPPORTED_VOICES: &[&str] = &[
    "Kore",
    "Puck",
    "Charon",
    "Fenrir",
    "Zephyr",
    "Vindemiatrix",
    "Gacrux",
    "Pulcherrima",
];

/// Display-only classification of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[strum(to_string = "male")]
    Male,
    #[strum(to_string = "female")]
    Female,
    #[strum(to_string = "neutral")]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceProfile {
    pub name: &'static str,
    pub gender: Gender,
    /// Whether the voice can be auditioned with a preview greeting
    pub preview: bool,
}

/// Voices offered to the user
pub const CATALOG: &[VoiceProfile] = &[
    VoiceProfile {
        name: "Kore",
        gender: Gender::Neutral,
        preview: true,
    },
    VoiceProfile {
        name: "Vindemiatrix",
        gender: Gender::Female,
        preview: true,
    },
    VoiceProfile {
        name: "Gacrux",
        gender: Gender::Male,
        preview: true,
    },
    VoiceProfile {
        name: "Pulcherrima",
        gender: Gender::Female,
        preview: true,
    },
];

/// Look up a catalog entry, ignoring case
pub fn find_profile(name: &str) -> Option<&'static VoiceProfile> {
    let name = name.trim();
    CATALOG.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn is_supported(name: &str) -> bool {
    let name = name.trim();
    SUPPORTED_VOICES.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Map a requested voice onto a supported id. Never fails: anything unknown
/// becomes [`DEFAULT_VOICE`].
pub fn resolve_voice(requested: &str) -> &'static str {
    let trimmed = requested.trim();
    match SUPPORTED_VOICES
        .iter()
        .copied()
        .find(|v| v.eq_ignore_ascii_case(trimmed))
    {
        Some(voice) => voice,
        None => {
            debug!(requested, fallback = DEFAULT_VOICE, "Unsupported voice, using default");
            DEFAULT_VOICE
        }
    }
}
