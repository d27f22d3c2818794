//! Build command - generates the landing pages

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use color_eyre::eyre::{Result, WrapErr};
use landify_core::{Config, GroupStore};
use landify_generator::{Builder, ChatClient, GroupState};

use super::check::quick_validate;

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildArgs {
    pub groups: PathBuf,
    pub output: PathBuf,
    pub model: Option<String>,
    pub limit: Option<usize>,
    pub skip_existing: bool,
    pub sitemap: bool,
}

/// Run the build command.
///
/// Generates one page per keyword group into the output directory, then
/// appends the new pages to the sitemap.
pub fn run(config_path: &Path, args: &BuildArgs) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?args, "Starting build");

    let mut config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;

    if let Some(model) = &args.model {
        tracing::info!(model = %model, "Overriding generation model from CLI");
        config.generation.model = model.clone();
    }

    let store = GroupStore::load(&args.groups).wrap_err_with(|| {
        format!("Failed to load keyword groups from {}", args.groups.display())
    })?;

    let warnings = quick_validate(store.groups());
    if !warnings.is_empty() {
        println!();
        println!("  Warnings:");
        for warn in &warnings {
            println!("  ⚠ {warn}");
        }
        println!();
    }

    tracing::debug!(?config, "Loaded configuration");

    let sitemap = args.sitemap && config.sitemap.enabled;
    let client =
        ChatClient::new(&config.generation).wrap_err("Failed to create generation client")?;
    let model = client.model().to_string();

    let builder = Builder::new(config, client, &args.output)
        .with_limit(args.limit)
        .skip_existing(args.skip_existing)
        .with_sitemap(sitemap);

    let stats = builder.build(store.groups()).wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed!");
    println!();
    println!("  Written:  {}", stats.written);
    println!("  Skipped:  {}", stats.skipped);
    println!("  Failed:   {}", stats.failed);
    if sitemap {
        println!("  Sitemap:  {} URL(s) added", stats.sitemap_added.len());
    }
    println!();
    println!("  Model:    {model}");
    println!("  Duration: {:.2}s", duration.as_secs_f64());
    println!("  Output:   {}", args.output.display());
    println!();

    let failed: Vec<_> = stats
        .groups
        .iter()
        .filter(|g| matches!(g.state, GroupState::Failed(_)))
        .collect();
    if !failed.is_empty() {
        println!("  Failed groups (re-run with --skip-existing to retry):");
        for report in failed {
            println!("  ✗ {} ({}): {}", report.name, report.slug, report.state);
        }
        println!();
    }

    tracing::info!(?duration, written = stats.written, "Build finished");

    Ok(())
}
