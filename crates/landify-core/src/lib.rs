//! Landify Core Library
//!
//! Core types, configuration, and error handling for the Landify landing page
//! generator.

pub mod config;
pub mod content;
pub mod error;
pub mod group;

pub use config::Config;
pub use content::{ClosingCta, FaqItem, Feature, GeneratedContent, Hero, QuoteForm};
pub use error::{CoreError, Result};
pub use group::{GroupStore, KeywordGroup, slugify};
