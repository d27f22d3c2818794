//! Landify CLI Library
//!
//! Command implementations for the Landify landing page generator, exposed
//! as a library so they can be driven from tests.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, check)
//!
//! # Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//!
//! use landify::cmd::build::{self, BuildArgs};
//!
//! let args = BuildArgs {
//!     groups: PathBuf::from("keyword_groups_for_landing_pages.json"),
//!     output: PathBuf::from("landing"),
//!     model: None,
//!     limit: Some(3),
//!     skip_existing: true,
//!     sitemap: true,
//! };
//! build::run(Path::new("landify.toml"), &args).unwrap();
//! ```

pub mod cmd;

// Re-export core types for convenience
pub use landify_core::{Config, GroupStore, KeywordGroup};
pub use landify_generator::{BuildStats, Builder, ChatClient};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// landify::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
