use anyhow::{Context, Result};
use fs_err as fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::errors::SiteGenError;
use crate::wire::WebsiteSpec;

pub const HTML_FILE: &str = "index.html";
pub const CSS_FILE: &str = "styles.css";
pub const JS_FILE: &str = "main.js";

#[derive(Debug, Clone)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Write html/css/js to their fixed names under `out_dir`, replacing
/// whatever is there. Each file lands atomically.
pub fn persist(spec: &WebsiteSpec, out_dir: &Path) -> Result<Vec<WrittenFile>> {
    fs::create_dir_all(out_dir).map_err(|e| SiteGenError::Persist(e.to_string()))?;

    let mut written = Vec::with_capacity(3);
    for (name, content) in [(HTML_FILE, &spec.html), (CSS_FILE, &spec.css), (JS_FILE, &spec.js)] {
        let path = out_dir.join(name);
        write_atomic(out_dir, &path, content)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(WrittenFile { path, bytes: content.len() as u64 });
    }
    Ok(written)
}

fn write_atomic(dir: &Path, path: &Path, content: &str) -> Result<(), SiteGenError> {
    let persist_err = |e: std::io::Error| SiteGenError::Persist(e.to_string());
    let mut tmp = NamedTempFile::new_in(dir).map_err(persist_err)?;
    tmp.write_all(content.as_bytes()).map_err(persist_err)?;
    tmp.persist(path).map_err(|e| persist_err(e.error))?;
    Ok(())
}
