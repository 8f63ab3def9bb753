use crate::wire::LlmRequest;
use chrono::Utc;
use fs_err as fs;
use serde_json::{json, to_string_pretty};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// stderr subscriber; `RUST_LOG` wins, otherwise `info` (or `debug` with --debug).
pub fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Where one run's model exchanges are kept, and which halves to keep.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub dir: PathBuf,
    pub save_request: bool,
    pub save_response: bool,
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

impl Transcript {
    pub fn new(root: &Path, tx: Uuid, save_request: bool, save_response: bool) -> Self {
        Self { dir: root.join(tx.to_string()), save_request, save_response }
    }

    pub fn is_enabled(&self) -> bool {
        self.save_request || self.save_response
    }

    pub fn save_stage(&self, req: &LlmRequest, raw_response: &str) -> anyhow::Result<SavedPaths> {
        let mut request_path = None;
        let mut response_path = None;
        if !self.is_enabled() {
            return Ok(SavedPaths { dir: self.dir.clone(), request: None, response: None });
        }
        fs::create_dir_all(&self.dir)?;

        if self.save_request {
            let p = self.dir.join(format!("{}.request.json", req.stage));
            let record = json!({ "saved_at": Utc::now(), "request": req });
            fs::write(&p, to_string_pretty(&record)?)?;
            request_path = Some(p);
        }

        if self.save_response {
            let p = self.dir.join(format!("{}.response.txt", req.stage));
            fs::write(&p, raw_response)?;
            response_path = Some(p);
        }

        Ok(SavedPaths { dir: self.dir.clone(), request: request_path, response: response_path })
    }
}

pub fn print_saved_paths(stage: &str, saved: &SavedPaths) {
    println!("debug[{stage}]: artifacts directory: {}", saved.dir.display());
    if let Some(p) = &saved.request {
        println!("debug[{stage}]: request saved at: {}", p.display());
    } else {
        println!("debug[{stage}]: request not saved (flag off)");
    }
    if let Some(p) = &saved.response {
        println!("debug[{stage}]: response saved at: {}", p.display());
    } else {
        println!("debug[{stage}]: response not saved (flag off)");
    }
    std::io::stdout().flush().ok();
}
