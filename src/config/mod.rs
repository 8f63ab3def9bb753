use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Args, ProviderKind};
use crate::prompt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    pub requirements: String,
    pub improvement: String,
    pub iterations: usize,
    pub images_dir: PathBuf,
    pub output_dir: PathBuf,
    pub image: ImageConfig,
    pub timeout_secs: u64,
    pub openai_url: String,
    pub api_key_env: String,
    pub ollama_url: String,
    pub transcript_dir: PathBuf,
    pub prompts: Prompts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub model: String,
    pub size: String,
    pub quality: String,
    pub concurrency: usize,
}

/// Prompt templates; see `prompt::render` for the `{marker}` syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub generate_system: String,
    pub generate_user: String,
    pub refine_system: String,
    pub refine_user: String,
    pub developer: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            model: "gpt-4o-mini-2024-07-18".into(),
            requirements: "We want a modern landing page with a hero section, three feature icons, and a footer.".into(),
            improvement: "Please enhance the design and add a testimonial section.".into(),
            iterations: 0,
            images_dir: PathBuf::from("output_website/images"),
            output_dir: PathBuf::from("output_website"),
            image: ImageConfig::default(),
            timeout_secs: 2400,
            openai_url: "https://api.openai.com".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            ollama_url: "http://localhost:11434".into(),
            transcript_dir: PathBuf::from(".vibe/tx"),
            prompts: Prompts::default(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: "dall-e-3".into(),
            size: "1024x1024".into(),
            quality: "standard".into(),
            concurrency: 1,
        }
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            generate_system: prompt::GENERATE_SYSTEM.into(),
            generate_user: prompt::GENERATE_USER.into(),
            refine_system: prompt::REFINE_SYSTEM.into(),
            refine_user: prompt::REFINE_USER.into(),
            developer: Some(prompt::DEVELOPER_NOTE.into()),
        }
    }
}

impl Config {
    /// Built-in defaults, overlaid with the TOML file when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let s = fs::read_to_string(p)?;
                Self::from_toml(&s).with_context(|| format!("parsing config {}", p.display()))
            }
        }
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Explicit CLI options win over anything loaded.
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(v) = &args.details { self.requirements = v.clone(); }
        if let Some(v) = args.provider { self.provider = v; }
        if let Some(v) = &args.model { self.model = v.clone(); }
        if let Some(v) = args.iterations { self.iterations = v; }
        if let Some(v) = &args.improvement { self.improvement = v.clone(); }
        if let Some(v) = &args.images_dir { self.images_dir = v.clone(); }
        if let Some(v) = &args.output_dir { self.output_dir = v.clone(); }
        if let Some(v) = args.timeout_secs { self.timeout_secs = v; }
        if let Some(v) = args.image_concurrency { self.image.concurrency = v; }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg = Config::from_toml(
            r#"
model = "gpt-4o"
iterations = 3

[image]
quality = "hd"

[prompts]
refine_system = "Be bold."
"#,
        )
        .unwrap();
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.iterations, 3);
        assert_eq!(cfg.image.quality, "hd");
        assert_eq!(cfg.image.size, "1024x1024");
        assert_eq!(cfg.prompts.refine_system, "Be bold.");
        assert_eq!(cfg.prompts.generate_user, prompt::GENERATE_USER);
        assert_eq!(cfg.provider, ProviderKind::OpenAI);
    }

    #[test]
    fn provider_is_read_lowercase() {
        let cfg = Config::from_toml("provider = \"ollama\"").unwrap();
        assert_eq!(cfg.provider, ProviderKind::Ollama);
    }

    #[test]
    fn cli_options_override_loaded_values() {
        let cfg = Config::from_toml("model = \"from-file\"\niterations = 4").unwrap();
        let args = Args::try_parse_from([
            "vibe_siteGen",
            "--model",
            "from-cli",
            "--output-dir",
            "site",
            "--image-concurrency",
            "3",
        ])
        .unwrap();
        let cfg = cfg.with_args(&args);
        assert_eq!(cfg.model, "from-cli");
        assert_eq!(cfg.iterations, 4);
        assert_eq!(cfg.output_dir, PathBuf::from("site"));
        assert_eq!(cfg.image.concurrency, 3);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(Config::from_toml("iterations = \"many\"").is_err());
    }
}
