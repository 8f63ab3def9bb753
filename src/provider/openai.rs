use async_trait::async_trait;
use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::SiteGenError;
use crate::wire::{spec_json_schema, Instruction, LlmRequest};

/// OpenAI chat completions with structured output pinned to the website
/// spec schema.
pub struct OpenAIProvider {
    base_url: String,
    api_key_env: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(base_url: String, api_key_env: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { base_url, api_key_env, client })
    }
}

/// Developer notes ride along with the system message.
pub(crate) fn system_text(ins: &Instruction) -> String {
    let mut system = ins.system.clone();
    if let Some(dev) = &ins.developer {
        system.push_str("\n\nDeveloper notes:\n");
        system.push_str(dev);
    }
    system
}

pub(crate) fn chat_body(req: &LlmRequest) -> Value {
    json!({
        "model": req.model,
        "messages": [
            { "role": "system", "content": system_text(&req.instruction) },
            { "role": "user", "content": req.instruction.user }
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "website_spec",
                "strict": true,
                "schema": spec_json_schema()
            }
        }
    })
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    async fn send(&self, req: &LlmRequest, debug: bool) -> Result<String> {
        let api_key = std::env::var(&self.api_key_env)
            .map_err(|_| SiteGenError::Config(format!("{} env var is not set", self.api_key_env)))?;

        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = chat_body(req);

        if debug {
            eprintln!(
                "debug[openai]: HTTP POST {} body:\n{}",
                url,
                serde_json::to_string_pretty(&body)?
            );
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SiteGenError::Provider(format!("openai request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SiteGenError::Provider(format!("openai read body failed: {e}")))?;

        if debug {
            eprintln!("debug[openai]: raw status: {}", status);
            eprintln!("debug[openai]: raw response:\n{}", &text);
        }

        Ok(read_chat_response(status, &text)?)
    }
}

/// Pulls the assistant's content out of a chat-completions reply. Any
/// non-success status, refusal or empty answer is a provider error.
pub(crate) fn read_chat_response(status: StatusCode, text: &str) -> Result<String, SiteGenError> {
    if !status.is_success() {
        return Err(SiteGenError::Provider(format!("OpenAI API error ({}): {}", status, text)));
    }

    let parsed: ChatResponse = serde_json::from_str(text)
        .map_err(|e| SiteGenError::Provider(format!("failed to parse OpenAI response: {e}\nRaw: {text}")))?;

    let message = parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| SiteGenError::Provider("OpenAI response has no choices".into()))?;

    if let Some(refusal) = message.refusal {
        return Err(SiteGenError::Provider(format!("model refused: {refusal}")));
    }
    message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| SiteGenError::Provider("OpenAI returned empty content".into()))
}
