use clap::Parser;

mod cli;
mod config;
mod errors;
mod generator;
mod image;
mod integrate;
mod log;
mod output;
mod pipeline;
mod prompt;
mod provider;
mod safety;
mod ux;
mod wire;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    log::init_tracing(args.debug);

    let cfg = config::Config::load(args.config.as_deref())?.with_args(&args);
    if args.debug {
        println!("debug: provider={:?} model={} iterations={}", cfg.provider, cfg.model, cfg.iterations);
    }

    let services = pipeline::Services::from_config(&cfg)?;
    let pipeline = pipeline::Pipeline::new(cfg, services);
    let summary = pipeline.run(&args.run_flags()).await?;

    if let Some(p) = &summary.snapshot {
        println!("\nFinal website spec saved to {}", p.display());
    }
    tracing::info!(
        images = summary.images.len(),
        integrated = summary.image_paths.len(),
        html_bytes = summary.spec.html.len(),
        "run complete"
    );
    ux::print_unresolved(&summary.unresolved);
    ux::print_written(&summary.written, &pipeline.config().output_dir);

    Ok(())
}
