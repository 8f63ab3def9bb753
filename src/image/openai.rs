use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ImageGenRequest, ImageService};
use crate::errors::SiteGenError;

/// OpenAI images API (`/v1/images/generations`), one image per call.
pub struct OpenAIImages {
    base_url: String,
    api_key_env: String,
    model: String,
    client: Client,
}

impl OpenAIImages {
    pub fn new(base_url: String, api_key_env: String, model: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { base_url, api_key_env, model, client })
    }
}

#[derive(Debug, Serialize)]
struct DalleRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'a str,
}

#[derive(Debug, Deserialize)]
struct DalleImage {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DalleResponse {
    #[serde(default)]
    data: Vec<DalleImage>,
}

/// First non-blank URL in the response, if any.
fn first_url(body: &str) -> Result<Option<String>> {
    let parsed: DalleResponse = serde_json::from_str(body)
        .map_err(|e| SiteGenError::Provider(format!("failed to parse images response: {e}")))?;
    Ok(parsed
        .data
        .into_iter()
        .next()
        .and_then(|d| d.url)
        .filter(|u| !u.trim().is_empty()))
}

#[async_trait]
impl ImageService for OpenAIImages {
    async fn generate(&self, req: &ImageGenRequest) -> Result<Option<String>> {
        let api_key = std::env::var(&self.api_key_env)
            .map_err(|_| SiteGenError::Config(format!("{} env var is not set", self.api_key_env)))?;
        let url = format!("{}/v1/images/generations", self.base_url.trim_end_matches('/'));
        let body = DalleRequestBody {
            model: &self.model,
            prompt: &req.prompt,
            n: 1,
            size: &req.size,
            quality: &req.quality,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SiteGenError::Provider(format!("images request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SiteGenError::Provider(format!("images read body failed: {e}")))?;
        if !status.is_success() {
            return Err(SiteGenError::Provider(format!("images API error ({}): {}", status, text)).into());
        }
        first_url(&text)
    }
}
