//! Text generation from image analysis.
//!
//! `Prompt` turns an `AnalysisResult` into chat messages; a `TextGenerator`
//! sends them to a chat-completion deployment and returns the reply.

mod azure_openai;
mod prompt;

pub use azure_openai::AzureOpenAiClient;
pub use prompt::Prompt;

use crate::error::GenerationServiceError;
use async_trait::async_trait;

/// Anything that can answer a `Prompt` with generated text.
///
/// Uses `async_trait` because the driver holds `&dyn TextGenerator`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One request, one reply. No streaming and no conversation state.
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationServiceError>;
}
