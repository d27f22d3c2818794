//! Keyword groups and the file they are loaded from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Slug used when a name normalises to nothing.
pub const DEFAULT_SLUG: &str = "landing-page";

/// One content group: a service theme and the keywords that target it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub primary_keyword: String,

    /// Keywords ordered by relevance, most relevant first.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    /// Name used for slugging and logging; unnamed groups get a positional
    /// label (`index` is 1-based).
    pub fn display_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("Group {index}")
        } else {
            self.name.clone()
        }
    }
}

/// Ordered collection of keyword groups read from a JSON file.
///
/// The file must be an object whose `groups` field is an array. The store is
/// read-only; the source file is never written back.
#[derive(Debug, Clone, Default)]
pub struct GroupStore {
    path: PathBuf,
    groups: Vec<KeywordGroup>,
}

impl GroupStore {
    /// Load groups from `path`.
    ///
    /// A missing or `null` `groups` field yields an empty store. Any other
    /// non-array shape is a format error and nothing is loaded.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Groups file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let groups = Self::parse(&content).map_err(|e| match e {
            CoreError::Format { message, .. } => CoreError::format(path, message),
            other => other,
        })?;

        debug!(path = %path.display(), count = groups.len(), "loaded keyword groups");

        Ok(Self {
            path: path.to_path_buf(),
            groups,
        })
    }

    /// Parse the contents of a groups file.
    pub fn parse(content: &str) -> Result<Vec<KeywordGroup>> {
        let data: Value = serde_json::from_str(content)?;

        let Value::Object(mut root) = data else {
            return Err(CoreError::format("", "expected a JSON object at top level"));
        };

        match root.remove("groups") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    serde_json::from_value(item).map_err(|e| {
                        CoreError::format("", format!("invalid group at index {i}: {e}"))
                    })
                })
                .collect(),
            Some(_) => Err(CoreError::format("", "expected 'groups' to be a list")),
        }
    }

    /// Path the groups were loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All groups in file order.
    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Derive a URL slug from a group name.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `-` and trims leading/trailing separators. Idempotent. Distinct
/// names can map to the same slug ("Hot Tub Removal" and "hot-tub removal");
/// the later page then overwrites the earlier one.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut pending_sep = false;

    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }

    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}
