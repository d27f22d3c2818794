//! Landify Generator Library
//!
//! Landing page generation pipeline for Landify.
//!
//! # Modules
//!
//! - [`prompt`] - Prompt construction from keyword groups
//! - [`client`] - Chat-completion client producing page copy
//! - [`template`] - HTML template system with named slots
//! - [`html`] - Landing page rendering and JSON-LD
//! - [`sitemap`] - Appending generated pages to an existing sitemap
//! - [`build`] - Build orchestration

pub mod build;
pub mod client;
pub mod html;
pub mod prompt;
pub mod sitemap;
pub mod template;

pub use build::{BuildError, BuildStats, Builder, GroupReport, GroupState};
pub use client::{ChatClient, ContentGenerator, GenerationError};
pub use html::{HtmlError, PageRenderer};
pub use prompt::{ChatMessage, PromptBuilder, Role};
pub use sitemap::{ChangeFreq, SitemapEntry, SitemapError, SitemapIntegrator};
pub use template::{Template, TemplateContext, TemplateRegistry};
