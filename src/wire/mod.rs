use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::SiteGenError;

/// ========================================
/// Website spec data model
/// ========================================

/// One image the model wants generated. `filename` doubles as the on-disk
/// name and as the placeholder token source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteSpec {
    pub html: String,
    pub css: String,
    pub js: String,
    pub images: Vec<ImageRequest>,
}

/// filename -> local path, successful images only.
pub type ImagePathMap = HashMap<String, String>;

/// `hero.png` -> `{{hero.png}}`
pub fn placeholder(filename: &str) -> String {
    format!("{{{{{filename}}}}}")
}

impl WebsiteSpec {
    /// Strict parse of a JSON document into a spec. Shape mismatches are
    /// reported as schema errors.
    pub fn from_json(text: &str) -> Result<Self, SiteGenError> {
        serde_json::from_str(text).map_err(|e| SiteGenError::Schema(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let spec = Self::from_json(&text)
            .with_context(|| format!("parsing website spec {}", path.display()))?;
        Ok(spec)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SiteGenError::Persist(e.to_string()))?;
        }
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body).map_err(|e| SiteGenError::Persist(e.to_string()))?;
        Ok(())
    }

    /// Plain-text rendering handed to the model when asking for a refinement.
    pub fn describe(&self) -> String {
        let images = self
            .images
            .iter()
            .map(|img| format!("- {}: {}", img.filename, img.prompt))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "HTML:\n{}\n\nCSS:\n{}\n\nJS:\n{}\n\nIMAGES:\n{}",
            self.html, self.css, self.js, images
        )
    }
}

/// JSON schema of [`WebsiteSpec`] in the strict structured-output dialect
/// (every property required, no extras).
pub fn spec_json_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "html": { "type": "string" },
            "css": { "type": "string" },
            "js": { "type": "string" },
            "images": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "prompt": { "type": "string" },
                        "filename": { "type": "string" }
                    },
                    "required": ["prompt", "filename"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["html", "css", "js", "images"],
        "additionalProperties": false
    })
}

/// ========================================
/// Request shape sent to a spec provider
/// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub system: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// `generate`, `refine.1`, ...
    pub stage: String,
    pub model: String,
    pub instruction: Instruction,
}
