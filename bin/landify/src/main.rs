//! Landify CLI
//!
//! Generates SEO landing pages from keyword groups.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Landify.
#[derive(Parser)]
#[command(
    name = "landify",
    version,
    about = "Generate local-service landing pages from keyword groups"
)]
struct Cli {
    /// Path to configuration file (optional; defaults apply when missing)
    #[arg(short, long, default_value = "landify.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Generate landing pages for every keyword group
    Build {
        /// Keyword groups JSON file
        #[arg(short, long, default_value = "keyword_groups_for_landing_pages.json")]
        groups: std::path::PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "landing")]
        output: std::path::PathBuf,
        /// Override the generation model
        #[arg(long)]
        model: Option<String>,
        /// Only process the first N groups
        #[arg(long)]
        limit: Option<usize>,
        /// Skip groups whose page already exists
        #[arg(long)]
        skip_existing: bool,
        /// Do not update the sitemap
        #[arg(long)]
        no_sitemap: bool,
    },
    /// Validate configuration and keyword groups
    Check {
        /// Keyword groups JSON file
        #[arg(short, long, default_value = "keyword_groups_for_landing_pages.json")]
        groups: std::path::PathBuf,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    landify::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            groups,
            output,
            model,
            limit,
            skip_existing,
            no_sitemap,
        } => {
            landify::cmd::build::run(
                &cli.config,
                &landify::cmd::build::BuildArgs {
                    groups,
                    output,
                    model,
                    limit,
                    skip_existing,
                    sitemap: !no_sitemap,
                },
            )?;
        }
        Commands::Check { groups, strict } => {
            landify::cmd::check::run(&cli.config, &groups, strict)?;
        }
    }

    Ok(())
}
