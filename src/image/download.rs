use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{Download, Downloader};

/// Plain HTTP GET; the status is reported, never turned into an error.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn get(&self, url: &str) -> Result<Download> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        Ok(Download { status, bytes })
    }
}
