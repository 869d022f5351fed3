use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use crate::ai::gemini::{resolve_api_key, GeminiProvider, DEFAULT_BASE_URL};
use crate::ai::mock::MockProvider;
use crate::ai::provider::AiProvider;
use crate::settings::config::{ProviderConfig, Settings};
use crate::voice::tts::TextToSpeech;

/// The script and speech halves of one configured provider
#[derive(Clone)]
pub struct Providers {
    pub text: Arc<dyn AiProvider>,
    pub speech: Arc<dyn TextToSpeech>,
}

/// Initializes the provider with the given name if it exists in settings,
/// else raises an error.
pub fn create_providers(settings: &Settings, provider: &str) -> Result<Providers> {
    let Some(provider_config) = settings.providers.get(provider) else {
        bail!("Provider '{provider}' is not configured in settings")
    };

    match provider_config {
        ProviderConfig::Gemini { api_key, base_url } => {
            let api_key = resolve_api_key(api_key.as_deref());
            if api_key.is_empty() {
                tracing::warn!("No Gemini API key configured; requests will be rejected");
            }
            let base_url = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
            info!(provider, base_url, "Using Gemini provider");

            let gemini = Arc::new(GeminiProvider::with_base_url(api_key, base_url)?);
            Ok(Providers {
                text: gemini.clone(),
                speech: gemini,
            })
        }
        ProviderConfig::Mock { behavior } => {
            info!(provider, ?behavior, "Using mock provider");
            let mock = Arc::new(MockProvider::new(behavior.clone()));
            Ok(Providers {
                text: mock.clone(),
                speech: mock,
            })
        }
    }
}

/// Providers for the active provider in settings
pub fn create_active_providers(settings: &Settings) -> Result<Providers> {
    let Some(name) = settings.active_provider.as_deref() else {
        bail!("No active provider configured in settings")
    };
    create_providers(settings, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockBehavior;

    #[test]
    fn test_unknown_provider_is_an_error() {
        let settings = Settings::default();
        assert!(create_providers(&settings, "missing").is_err());
    }

    #[test]
    fn test_mock_provider_from_settings() {
        let mut settings = Settings::default();
        settings.providers.insert(
            "offline".to_string(),
            ProviderConfig::Mock {
                behavior: MockBehavior::Success,
            },
        );
        settings.active_provider = Some("offline".to_string());

        let providers = create_active_providers(&settings).unwrap();
        assert_eq!(providers.text.name(), "mock");
    }

    #[test]
    fn test_no_active_provider() {
        let mut settings = Settings::default();
        settings.active_provider = None;
        assert!(create_active_providers(&settings).is_err());
    }
}
