use crate::ai::{error::AiError, types::TextRequest};

/// A remote model that turns a prompt into text
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate_text(&self, request: TextRequest) -> Result<String, AiError>;
}
