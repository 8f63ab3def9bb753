use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cli::RunFlags;
use crate::config::Config;
use crate::errors::SiteGenError;
use crate::generator::SpecGenerator;
use crate::image::download::HttpDownloader;
use crate::image::openai::OpenAIImages;
use crate::image::{fetch_all, DynDownloader, DynImageService, ImageOutcome};
use crate::integrate::{integrate, unresolved_placeholders};
use crate::log::Transcript;
use crate::output::{persist, WrittenFile};
use crate::provider::{make_provider, DynProvider};
use crate::ux;
use crate::wire::{ImagePathMap, WebsiteSpec};

/// The external collaborators a run talks to.
pub struct Services {
    pub spec: DynProvider,
    pub images: DynImageService,
    pub downloader: DynDownloader,
}

impl Services {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            spec: make_provider(cfg)?,
            images: Box::new(OpenAIImages::new(
                cfg.openai_url.clone(),
                cfg.api_key_env.clone(),
                cfg.image.model.clone(),
                cfg.timeout_secs,
            )?),
            downloader: Box::new(HttpDownloader::new(cfg.timeout_secs)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    File(PathBuf),
    Generate,
}

/// An existing spec file always wins. Skipping generation without one is a
/// configuration error, raised before anything touches the network.
pub fn choose_source(flags: &RunFlags) -> Result<SpecSource, SiteGenError> {
    match &flags.spec_file {
        Some(p) if p.is_file() => Ok(SpecSource::File(p.clone())),
        _ if flags.skip_web => Err(SiteGenError::Config(
            "--skip-web is set, but no valid --spec-file provided. Cannot skip website generation.".into(),
        )),
        _ => Ok(SpecSource::Generate),
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub spec: WebsiteSpec,
    pub image_paths: ImagePathMap,
    pub images: Vec<ImageOutcome>,
    pub written: Vec<WrittenFile>,
    pub unresolved: Vec<String>,
    pub snapshot: Option<PathBuf>,
}

pub struct Pipeline {
    cfg: Config,
    services: Services,
}

impl Pipeline {
    pub fn new(cfg: Config, services: Services) -> Self {
        Self { cfg, services }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// acquire -> refine xN -> snapshot -> images -> integrate -> write
    pub async fn run(&self, flags: &RunFlags) -> Result<RunSummary> {
        let source = choose_source(flags)?;
        let tx = Uuid::new_v4();
        let transcript = Transcript::new(&self.cfg.transcript_dir, tx, flags.save_request, flags.save_response);
        let gen = SpecGenerator {
            provider: self.services.spec.as_ref(),
            prompts: &self.cfg.prompts,
            transcript: transcript.is_enabled().then_some(&transcript),
            debug: flags.debug,
        };

        let spec = self.acquire(&source, &gen).await?;
        ux::show_spec("Website spec acquired", &spec);

        let spec = self.refine(spec, &gen).await?;
        ux::print_spec_json("Website spec after all iterations", &spec)?;

        let snapshot = match &flags.output_spec {
            Some(path) => {
                spec.save(path)
                    .with_context(|| format!("saving website spec to {}", path.display()))?;
                info!(path = %path.display(), "website spec saved");
                Some(path.clone())
            }
            None => None,
        };

        let (image_paths, images) = if flags.skip_images {
            ux::stage("Skipping image generation step");
            (ImagePathMap::new(), Vec::new())
        } else {
            self.generate_images(&spec, flags.progress).await
        };

        let final_spec = integrate(&spec, &image_paths);
        let unresolved = unresolved_placeholders(&final_spec);
        if !unresolved.is_empty() {
            warn!(tokens = ?unresolved, "placeholders left unresolved");
        }

        ux::stage("Writing website files");
        let written = persist(&final_spec, &self.cfg.output_dir)?;
        info!(dir = %self.cfg.output_dir.display(), "website files written");

        Ok(RunSummary { spec: final_spec, image_paths, images, written, unresolved, snapshot })
    }

    async fn acquire(&self, source: &SpecSource, gen: &SpecGenerator<'_>) -> Result<WebsiteSpec> {
        match source {
            SpecSource::File(path) => {
                ux::stage(&format!("Loading existing website spec from {}", path.display()));
                WebsiteSpec::load(path)
            }
            SpecSource::Generate => {
                ux::stage(&format!("Generating website spec using model: {}", self.cfg.model));
                gen.generate(&self.cfg.requirements, &self.cfg.model).await
            }
        }
    }

    /// Each pass feeds on the previous pass's output; zero passes returns
    /// `spec` as it came in.
    pub async fn refine(&self, mut spec: WebsiteSpec, gen: &SpecGenerator<'_>) -> Result<WebsiteSpec> {
        let total = self.cfg.iterations;
        for pass in 1..=total {
            ux::stage(&format!("Refinement iteration {pass} of {total}"));
            spec = gen.refine(&spec, &self.cfg.improvement, &self.cfg.model, pass).await?;
        }
        Ok(spec)
    }

    async fn generate_images(&self, spec: &WebsiteSpec, progress: bool) -> (ImagePathMap, Vec<ImageOutcome>) {
        ux::stage(&format!("Generating {} image(s) into {}", spec.images.len(), self.cfg.images_dir.display()));
        let pb = ux::image_progress(spec.images.len(), progress);
        let (map, outcomes) = fetch_all(
            self.services.images.as_ref(),
            self.services.downloader.as_ref(),
            &spec.images,
            &self.cfg.images_dir,
            &self.cfg.image,
            &|outcome| {
                pb.set_message(outcome.filename().to_string());
                pb.inc(1);
            },
        )
        .await;
        pb.finish_and_clear();
        ux::print_image_dashboard(&outcomes);
        (map, outcomes)
    }
}
