use colored::Colorize;
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::image::ImageOutcome;
use crate::output::WrittenFile;
use crate::wire::WebsiteSpec;

pub fn stage(title: &str) {
    println!("\n{} {}", "==>".cyan().bold(), title.bold());
}

pub fn show_spec(label: &str, spec: &WebsiteSpec) {
    println!("\n=== {} ===", label.bold());
    println!(
        "  html: {}   css: {}   js: {}   images: {}",
        format_size(spec.html.len(), DECIMAL),
        format_size(spec.css.len(), DECIMAL),
        format_size(spec.js.len(), DECIMAL),
        spec.images.len()
    );
    for (i, img) in spec.images.iter().enumerate() {
        println!("  {}. {}  {}", i + 1, img.filename.green(), img.prompt.dimmed());
    }
}

/// Full JSON of the spec, placeholders and all.
pub fn spec_json_block(label: &str, spec: &WebsiteSpec) -> serde_json::Result<String> {
    Ok(format!("\n=== {} ===\n{}", label, serde_json::to_string_pretty(spec)?))
}

pub fn print_spec_json(label: &str, spec: &WebsiteSpec) -> serde_json::Result<()> {
    println!("{}", spec_json_block(label, spec)?);
    Ok(())
}

pub fn image_progress(total: usize, enabled: bool) -> ProgressBar {
    if !enabled || total == 0 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("  {spinner} [{bar:30}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

pub fn image_line(outcome: &ImageOutcome) -> String {
    match outcome {
        ImageOutcome::Saved { filename, path, bytes } => format!(
            "{}  {} -> {} ({})",
            "[SAVED]".green().bold(),
            filename,
            path.display(),
            format_size(*bytes, DECIMAL)
        ),
        ImageOutcome::Skipped { filename, reason } => {
            format!("{}  {} — {}", "[SKIPPED]".yellow().bold(), filename, reason)
        }
    }
}

pub fn print_image_dashboard(outcomes: &[ImageOutcome]) {
    let saved = outcomes.iter().filter(|o| matches!(o, ImageOutcome::Saved { .. })).count();
    let skipped = outcomes.len() - saved;
    println!(
        "\n{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━━ Images ━━━━━━━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    println!("  {}: {}   {}: {}", "Saved".green().bold(), saved, "Skipped".yellow().bold(), skipped);
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());
    for o in outcomes {
        println!("{}", image_line(o));
    }
}

pub fn print_unresolved(tokens: &[String]) {
    if tokens.is_empty() {
        return;
    }
    println!("\n{}", "Unresolved placeholders (left as-is):".yellow().bold());
    for t in tokens {
        println!(" - {}", t);
    }
}

pub fn print_written(files: &[WrittenFile], out_dir: &Path) {
    let total: u64 = files.iter().map(|f| f.bytes).sum();
    println!(
        "\n{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━ Website Files ━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    println!("  {}: {}   {}: {}", "Files".green().bold(), files.len(), "Bytes".bold(), format_size(total, DECIMAL));
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());
    for f in files {
        println!("  {}  {}", f.path.display(), format_size(f.bytes, DECIMAL).dimmed());
    }
    println!("\nAll done! You can now serve the contents of: {}", out_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn image_line_names_the_reason_for_a_skip() {
        colored::control::set_override(false);
        let line = image_line(&ImageOutcome::Skipped {
            filename: "a.png".into(),
            reason: "failed to download image. Status code: 404".into(),
        });
        assert_eq!(line, "[SKIPPED]  a.png — failed to download image. Status code: 404");

        let saved = image_line(&ImageOutcome::Saved { filename: "b.png".into(), path: PathBuf::from("images/b.png"), bytes: 2_000 });
        assert!(saved.starts_with("[SAVED]  b.png -> images/b.png ("));
    }

    #[test]
    fn spec_json_block_prints_the_whole_spec() {
        let spec = WebsiteSpec { html: "<img src='{{a.png}}'>".into(), ..WebsiteSpec::default() };
        let block = spec_json_block("Website spec after all iterations", &spec).unwrap();
        let (head, json) = block.split_once('\n').unwrap().1.split_once('\n').unwrap();
        assert_eq!(head, "=== Website spec after all iterations ===");
        assert_eq!(serde_json::from_str::<WebsiteSpec>(json).unwrap(), spec);
    }
}
