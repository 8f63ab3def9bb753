use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use fs_err as fs;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ImageConfig;
use crate::safety::filename_is_allowed;
use crate::wire::{ImagePathMap, ImageRequest};

pub mod download;
pub mod openai;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGenRequest {
    pub prompt: String,
    pub size: String,
    pub quality: String,
}

/// A text-to-image model. `Ok(None)` means the call went through but no
/// usable image URL came back.
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn generate(&self, req: &ImageGenRequest) -> Result<Option<String>>;
}

pub struct Download {
    pub status: u16,
    pub bytes: Bytes,
}

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn get(&self, url: &str) -> Result<Download>;
}

pub type DynImageService = Box<dyn ImageService + Send + Sync>;
pub type DynDownloader = Box<dyn Downloader + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Saved { filename: String, path: PathBuf, bytes: u64 },
    Skipped { filename: String, reason: String },
}

impl ImageOutcome {
    pub fn filename(&self) -> &str {
        match self {
            ImageOutcome::Saved { filename, .. } | ImageOutcome::Skipped { filename, .. } => filename,
        }
    }

    /// The saved file, or `None` when the image was skipped.
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            ImageOutcome::Saved { path, .. } => Some(path),
            ImageOutcome::Skipped { .. } => None,
        }
    }
}

/// Path as it should appear inside generated code: forward slashes only.
pub fn link_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Generate one image, download it and store it as `dir/filename`.
/// Every failure is soft: it is logged and comes back as `Skipped`.
pub async fn fetch_and_save_image(
    service: &dyn ImageService,
    downloader: &dyn Downloader,
    req: &ImageRequest,
    dir: &Path,
    opts: &ImageConfig,
) -> ImageOutcome {
    let skip = |reason: String| {
        warn!(filename = %req.filename, prompt = %req.prompt, "{reason}");
        ImageOutcome::Skipped { filename: req.filename.clone(), reason }
    };

    if !filename_is_allowed(&req.filename) {
        return skip(format!("refusing image filename {:?}", req.filename));
    }

    let gen = ImageGenRequest {
        prompt: req.prompt.clone(),
        size: opts.size.clone(),
        quality: opts.quality.clone(),
    };
    let url = match service.generate(&gen).await {
        Ok(Some(url)) => url,
        Ok(None) => return skip("no valid image URL returned".into()),
        Err(e) => return skip(format!("error generating image: {e:#}")),
    };
    info!(filename = %req.filename, %url, "image generated");

    if let Err(e) = fs::create_dir_all(dir) {
        return skip(format!("cannot create {}: {e}", dir.display()));
    }

    let download = match downloader.get(&url).await {
        Ok(d) => d,
        Err(e) => return skip(format!("failed to download image: {e:#}")),
    };
    if download.status != 200 {
        return skip(format!("failed to download image. Status code: {}", download.status));
    }

    let path = dir.join(&req.filename);
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            return skip(format!("cannot create {}: {e}", parent.display()));
        }
    }
    if let Err(e) = fs::write(&path, &download.bytes) {
        return skip(format!("failed to save image: {e}"));
    }
    info!(filename = %req.filename, path = %path.display(), "image saved");
    ImageOutcome::Saved {
        filename: req.filename.clone(),
        path,
        bytes: download.bytes.len() as u64,
    }
}

/// Fetch every request with at most `opts.concurrency` in flight. Outcomes
/// come back in request order, one per request; only saved images enter the
/// map.
pub async fn fetch_all(
    service: &dyn ImageService,
    downloader: &dyn Downloader,
    requests: &[ImageRequest],
    dir: &Path,
    opts: &ImageConfig,
    on_done: &(dyn Fn(&ImageOutcome) + Sync),
) -> (ImagePathMap, Vec<ImageOutcome>) {
    let outcomes: Vec<ImageOutcome> = stream::iter(requests)
        .map(|req| async move {
            let outcome = fetch_and_save_image(service, downloader, req, dir, opts).await;
            on_done(&outcome);
            outcome
        })
        .buffered(opts.concurrency.max(1))
        .collect()
        .await;

    let map = outcomes
        .iter()
        .cloned()
        .filter_map(|o| {
            let filename = o.filename().to_string();
            o.into_path().map(|p| (filename, link_path(&p)))
        })
        .collect();
    (map, outcomes)
}
