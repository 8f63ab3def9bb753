use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Prompts;
use crate::errors::SiteGenError;
use crate::log::{print_saved_paths, Transcript};
use crate::prompt::render;
use crate::provider::Provider;
use crate::wire::{Instruction, LlmRequest, WebsiteSpec};

/// Asks a [`Provider`] for website specs and validates every answer before
/// handing it on.
pub struct SpecGenerator<'a> {
    pub provider: &'a dyn Provider,
    pub prompts: &'a Prompts,
    pub transcript: Option<&'a Transcript>,
    pub debug: bool,
}

impl<'a> SpecGenerator<'a> {
    pub fn generate_request(&self, requirements: &str, model: &str) -> LlmRequest {
        LlmRequest {
            stage: "generate".into(),
            model: model.into(),
            instruction: Instruction {
                system: self.prompts.generate_system.clone(),
                user: render(&self.prompts.generate_user, &[("requirements", requirements)]),
                developer: self.prompts.developer.clone(),
            },
        }
    }

    pub fn refine_request(&self, current: &WebsiteSpec, instructions: &str, model: &str, pass: usize) -> LlmRequest {
        let description = current.describe();
        LlmRequest {
            stage: format!("refine.{pass}"),
            model: model.into(),
            instruction: Instruction {
                system: self.prompts.refine_system.clone(),
                user: render(
                    &self.prompts.refine_user,
                    &[("instructions", instructions), ("current", &description)],
                ),
                developer: self.prompts.developer.clone(),
            },
        }
    }

    /// Fresh spec from a requirements document.
    pub async fn generate(&self, requirements: &str, model: &str) -> Result<WebsiteSpec> {
        let req = self.generate_request(requirements, model);
        self.exchange(&req).await
    }

    /// New spec built from `current` plus free-form instructions. The image
    /// list of the answer replaces the old one outright.
    pub async fn refine(&self, current: &WebsiteSpec, instructions: &str, model: &str, pass: usize) -> Result<WebsiteSpec> {
        let req = self.refine_request(current, instructions, model, pass);
        self.exchange(&req).await
    }

    async fn exchange(&self, req: &LlmRequest) -> Result<WebsiteSpec> {
        debug!(stage = %req.stage, model = %req.model, "sending spec request");
        let raw = self
            .provider
            .send(req, self.debug)
            .await
            .with_context(|| format!("{} request to model {} failed", req.stage, req.model))?;

        if let Some(t) = self.transcript {
            let saved = t.save_stage(req, &raw)?;
            if self.debug {
                print_saved_paths(&req.stage, &saved);
            }
        }

        let spec = parse_spec(&raw).with_context(|| format!("{} response did not match the website spec schema", req.stage))?;
        info!(stage = %req.stage, images = spec.images.len(), "spec received");
        Ok(spec)
    }
}

/// Strict parse first; if the model wrapped its JSON in prose or fences,
/// retry on the first balanced `{...}` object in the text.
pub fn parse_spec(content: &str) -> Result<WebsiteSpec, SiteGenError> {
    match WebsiteSpec::from_json(content) {
        Ok(spec) => Ok(spec),
        Err(strict) => match extract_first_json_object(content) {
            Some(obj) if obj.len() != content.trim().len() => WebsiteSpec::from_json(&obj),
            _ => Err(strict),
        },
    }
}

/// Extracts the first top-level JSON object substring from a string.
/// Braces inside string literals are ignored; returns None if not found.
fn extract_first_json_object(s: &str) -> Option<String> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' if start.is_some() => in_string = true,
            '{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let st = start?;
                    return Some(s[st..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}
