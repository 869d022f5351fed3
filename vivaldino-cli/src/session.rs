use anyhow::Result;
use std::path::PathBuf;
use vivaldino_core::ai::{create_providers, Providers};
use vivaldino_core::audio;
use vivaldino_core::settings::SettingsManager;
use vivaldino_core::Studio;

/// Where settings come from and which provider to use
#[derive(Debug, Default, Clone)]
pub struct SessionOptions {
    pub settings_path: Option<PathBuf>,
    pub profile: Option<String>,
    pub provider: Option<String>,
}

pub struct Session {
    pub studio: Studio,
    pub settings: SettingsManager,
    pub provider_name: String,
}

impl Session {
    pub fn open(options: SessionOptions) -> Result<Self> {
        let settings = match options.settings_path {
            Some(path) => SettingsManager::from_path(path)?,
            None => SettingsManager::from_profile(options.profile.as_deref())?,
        };
        let config = settings.settings();

        let Some(provider_name) = options.provider.or_else(|| config.active_provider.clone())
        else {
            anyhow::bail!(
                "No active provider configured in {}",
                settings.path().display()
            );
        };
        let Providers { text, speech } = create_providers(&config, &provider_name)?;

        let studio = Studio::new(text, speech, audio::default_output(), config.studio_config());

        Ok(Self {
            studio,
            settings,
            provider_name,
        })
    }
}
