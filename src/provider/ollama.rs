use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::SiteGenError;
use crate::wire::{Instruction, LlmRequest};
use super::openai::system_text;
use super::Provider;

pub struct Ollama {
    pub url: String,
    client: Client,
}

impl Ollama {
    pub fn new(url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { url, client })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg>,
    stream: bool,
    format: &'a str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct Msg {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

fn to_messages(ins: &Instruction) -> Vec<Msg> {
    vec![
        Msg { role: "system".into(), content: system_text(ins) },
        Msg { role: "user".into(), content: ins.user.clone() },
    ]
}

#[async_trait]
impl Provider for Ollama {
    async fn send(&self, req: &LlmRequest, debug: bool) -> Result<String> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &req.model,
            messages: to_messages(&req.instruction),
            stream: false,
            format: "json",
            options: OllamaOptions { temperature: 0.1 },
        };

        if debug {
            eprintln!("debug/ollama: POST {}", url);
        }

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SiteGenError::Provider(format!("ollama request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SiteGenError::Provider(format!("ollama read body failed: {e}")))?;

        if debug {
            eprintln!("debug/ollama: raw body:\n{}\n", text);
        }

        Ok(read_chat_response(status, &text)?)
    }
}

pub(crate) fn read_chat_response(status: StatusCode, text: &str) -> Result<String, SiteGenError> {
    if !status.is_success() {
        return Err(SiteGenError::Provider(format!("ollama error ({}): {}", status, text)));
    }
    // Some proxies hand back the bare model output instead of the chat envelope.
    match serde_json::from_str::<ChatResponse>(text) {
        Ok(c) => Ok(c.message.content),
        Err(_) => Ok(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_envelope_is_unwrapped() {
        let body = r#"{"model":"llama3","message":{"role":"assistant","content":"{\"html\":\"x\"}"},"done":true}"#;
        assert_eq!(read_chat_response(StatusCode::OK, body).unwrap(), r#"{"html":"x"}"#);
    }

    #[test]
    fn bare_body_is_passed_through() {
        let body = r#"{"html":"","css":"","js":"","images":[]}"#;
        assert_eq!(read_chat_response(StatusCode::OK, body).unwrap(), body);
    }

    #[test]
    fn error_status_is_a_provider_error() {
        let err = read_chat_response(StatusCode::NOT_FOUND, "model not found").unwrap_err();
        assert!(matches!(err, SiteGenError::Provider(msg) if msg.contains("404") && msg.contains("model not found")));
    }

    #[test]
    fn messages_fold_developer_notes_into_system() {
        let ins = Instruction { system: "s".into(), user: "u".into(), developer: Some("d".into()) };
        let msgs = to_messages(&ins);
        assert_eq!(msgs[0].role, "system");
        assert_eq!(msgs[0].content, "s\n\nDeveloper notes:\nd");
        assert_eq!(msgs[1].content, "u");
    }
}
