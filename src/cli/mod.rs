use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Ollama,
}

/// Options left unset fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(name="vibe_siteGen", version, about="Generate a website with an LLM, then fill it with generated images")]
pub struct Args {
    /// Textual requirements for the initial website.
    #[arg(long)]
    pub details: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    /// Number of refinement passes after the spec is acquired.
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Instructions used for every refinement pass.
    #[arg(long)]
    pub improvement: Option<String>,

    /// Existing website spec JSON. When it exists it is loaded instead of generating.
    #[arg(long)]
    pub spec_file: Option<PathBuf>,

    /// Skip spec generation (requires --spec-file).
    #[arg(long, default_value_t = false)]
    pub skip_web: bool,

    #[arg(long, default_value_t = false)]
    pub skip_images: bool,

    /// Save the spec after refinement to this JSON file.
    #[arg(long)]
    pub output_spec: Option<PathBuf>,

    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// How many images to fetch at once.
    #[arg(long)]
    pub image_concurrency: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub save_request: bool,

    #[arg(long, default_value_t = false)]
    pub save_response: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub progress: bool,

    /// TOML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn run_flags(&self) -> RunFlags {
        RunFlags {
            spec_file: self.spec_file.clone(),
            skip_web: self.skip_web,
            skip_images: self.skip_images,
            output_spec: self.output_spec.clone(),
            save_request: self.save_request,
            save_response: self.save_response,
            debug: self.debug,
            progress: self.progress,
        }
    }
}

/// Per-run switches that never come from the config file.
#[derive(Debug, Clone, Default)]
pub struct RunFlags {
    pub spec_file: Option<PathBuf>,
    pub skip_web: bool,
    pub skip_images: bool,
    pub output_spec: Option<PathBuf>,
    pub save_request: bool,
    pub save_response: bool,
    pub debug: bool,
    pub progress: bool,
}
