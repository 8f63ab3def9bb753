use anyhow::Result;
use async_trait::async_trait;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::wire::LlmRequest;

pub mod openai;
pub mod ollama;

/// A chat model that answers with the raw text of its reply. Turning that
/// text into a spec is the caller's job (see `generator`).
#[async_trait]
pub trait Provider: Send + Sync {
    async fn send(&self, req: &LlmRequest, debug: bool) -> Result<String>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    match cfg.provider {
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(
            cfg.openai_url.clone(),
            cfg.api_key_env.clone(),
            cfg.timeout_secs,
        )?)),
        ProviderKind::Ollama => Ok(Box::new(ollama::Ollama::new(
            cfg.ollama_url.clone(),
            cfg.timeout_secs,
        )?)),
    }
}
