pub mod error;
pub mod factory;
pub mod gemini;
pub mod mock;
pub mod provider;
pub mod types;

pub use error::AiError;
pub use factory::{create_active_providers, create_providers, Providers};
pub use gemini::GeminiProvider;
pub use mock::{MockBehavior, MockProvider};
pub use provider::AiProvider;
pub use types::*;
