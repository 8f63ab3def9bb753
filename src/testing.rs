//! In-process fakes for the three external collaborators.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::errors::SiteGenError;
use crate::image::{Download, Downloader, ImageGenRequest, ImageService};
use crate::provider::Provider;
use crate::wire::LlmRequest;

/// Replies with canned answers in order; errors once they run out.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<LlmRequest>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn send(&self, req: &LlmRequest, _debug: bool) -> Result<String> {
        self.seen.lock().unwrap().push(req.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SiteGenError::Provider("no scripted reply left".into()).into())
    }
}

/// Answers `https://images.test/<prompt>` unless the prompt was marked.
#[derive(Default)]
pub struct FakeImages {
    failing: HashSet<String>,
    no_url: HashSet<String>,
    seen: Mutex<Vec<ImageGenRequest>>,
}

impl FakeImages {
    pub fn failing(mut self, prompt: &str) -> Self {
        self.failing.insert(prompt.into());
        self
    }

    pub fn without_url(mut self, prompt: &str) -> Self {
        self.no_url.insert(prompt.into());
        self
    }

    pub fn requests(&self) -> Vec<ImageGenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageService for FakeImages {
    async fn generate(&self, req: &ImageGenRequest) -> Result<Option<String>> {
        self.seen.lock().unwrap().push(req.clone());
        if self.failing.contains(&req.prompt) {
            return Err(SiteGenError::Provider(format!("images API error (500): {}", req.prompt)).into());
        }
        if self.no_url.contains(&req.prompt) {
            return Ok(None);
        }
        Ok(Some(format!("https://images.test/{}", req.prompt)))
    }
}

/// Serves `img:<url>` with status 200 unless told otherwise.
#[derive(Default)]
pub struct FakeDownloader {
    statuses: HashMap<String, u16>,
    seen: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub fn status_for(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.into(), status);
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn get(&self, url: &str) -> Result<Download> {
        self.seen.lock().unwrap().push(url.to_string());
        let status = self.statuses.get(url).copied().unwrap_or(200);
        Ok(Download { status, bytes: Bytes::from(format!("img:{url}")) })
    }
}

// Shared handles so a test can keep inspecting a fake after boxing it into
// `Services`.

#[async_trait]
impl<T: Provider + ?Sized> Provider for Arc<T> {
    async fn send(&self, req: &LlmRequest, debug: bool) -> Result<String> {
        (**self).send(req, debug).await
    }
}

#[async_trait]
impl<T: ImageService + ?Sized> ImageService for Arc<T> {
    async fn generate(&self, req: &ImageGenRequest) -> Result<Option<String>> {
        (**self).generate(req).await
    }
}

#[async_trait]
impl<T: Downloader + ?Sized> Downloader for Arc<T> {
    async fn get(&self, url: &str) -> Result<Download> {
        (**self).get(url).await
    }
}
