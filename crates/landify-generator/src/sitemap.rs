//! Sitemap integration.
//!
//! Appends generated landing pages to an existing, hand-maintained
//! `sitemap.xml` without touching the entries already there.

use std::{
    collections::HashSet,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};

use chrono::NaiveDate;
use landify_core::Config;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Comment placed above the appended block.
pub const GENERATED_MARKER: &str = "<!-- Generated Landing Pages -->";

const CLOSING_TAG: &str = "</urlset>";

static LOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<loc>\s*([^<]*?)\s*</loc>").expect("valid regex"));

/// Sitemap integration errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error.
    #[error("failed to scan landing directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// No sitemap at the expected path.
    #[error("sitemap not found at {0}")]
    NotFound(PathBuf),

    /// The sitemap has no closing `</urlset>`.
    #[error("no closing </urlset> tag in {0}")]
    MissingUrlset(PathBuf),

    /// Unknown `<changefreq>` value.
    #[error("invalid changefreq: {0}")]
    ChangeFreq(String),
}

/// Result type for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Change frequency for sitemap entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl FromStr for ChangeFreq {
    type Err = SitemapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(SitemapError::ChangeFreq(s.to_string())),
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

impl SitemapEntry {
    /// Render the entry as an indented `<url>` element.
    pub fn to_xml(&self) -> String {
        format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>",
            escape_xml(&self.loc),
            self.lastmod.format("%Y-%m-%d"),
            self.changefreq,
            self.priority
        )
    }
}

/// Adds landing pages found on disk to an existing sitemap.
#[derive(Debug)]
pub struct SitemapIntegrator {
    sitemap_path: PathBuf,
    landing_dir: PathBuf,
    base_url: String,
    changefreq: ChangeFreq,
    priority: f32,
    exclude: HashSet<String>,
}

impl SitemapIntegrator {
    /// Create an integrator for pages written to `landing_dir`.
    ///
    /// The sitemap lives at `sitemap.path` when configured, otherwise next to
    /// the landing directory.
    pub fn new(config: &Config, landing_dir: impl Into<PathBuf>) -> Result<Self> {
        let landing_dir = landing_dir.into();
        let sitemap_path = match &config.sitemap.path {
            Some(path) => PathBuf::from(path),
            None => landing_dir
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join("sitemap.xml"),
        };

        // trailing slash is added per entry
        let base_url = config.landing_url("");
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            sitemap_path,
            landing_dir,
            base_url,
            changefreq: config.sitemap.changefreq.parse()?,
            priority: config.sitemap.priority,
            exclude: config.sitemap.exclude.iter().cloned().collect(),
        })
    }

    pub fn sitemap_path(&self) -> &Path {
        &self.sitemap_path
    }

    /// URLs already listed in `xml`.
    pub fn existing_urls(xml: &str) -> HashSet<String> {
        LOC_RE
            .captures_iter(xml)
            .map(|cap| unescape_xml(&cap[1]))
            .collect()
    }

    /// Public URLs of the landing directories holding an `index.html`,
    /// sorted by directory name.
    pub fn candidate_urls(&self) -> Result<Vec<String>> {
        let mut urls = Vec::new();

        let walker = WalkDir::new(&self.landing_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if self.exclude.contains(name) {
                debug!(dir = name, "skipping excluded landing directory");
                continue;
            }
            if !entry.path().join("index.html").is_file() {
                continue;
            }

            urls.push(format!("{}/{}/", self.base_url, name));
        }

        Ok(urls)
    }

    /// Append entries for every landing page not yet in the sitemap.
    ///
    /// Returns the URLs added. The file is left untouched when nothing is new.
    pub fn integrate(&self, today: NaiveDate) -> Result<Vec<String>> {
        if !self.sitemap_path.is_file() {
            return Err(SitemapError::NotFound(self.sitemap_path.clone()));
        }

        let xml = fs::read_to_string(&self.sitemap_path)?;
        let existing = Self::existing_urls(&xml);
        debug!(count = existing.len(), "found existing sitemap URLs");

        let new_urls: Vec<String> = self
            .candidate_urls()?
            .into_iter()
            .filter(|url| !existing.contains(url))
            .collect();

        if new_urls.is_empty() {
            info!(path = %self.sitemap_path.display(), "sitemap is up to date");
            return Ok(new_urls);
        }

        let entries: Vec<SitemapEntry> = new_urls
            .iter()
            .map(|loc| SitemapEntry {
                loc: loc.clone(),
                lastmod: today,
                changefreq: self.changefreq,
                priority: self.priority,
            })
            .collect();

        let updated = insert_entries(&xml, &entries)
            .ok_or_else(|| SitemapError::MissingUrlset(self.sitemap_path.clone()))?;
        fs::write(&self.sitemap_path, updated)?;

        info!(
            path = %self.sitemap_path.display(),
            added = new_urls.len(),
            "updated sitemap"
        );
        Ok(new_urls)
    }
}

/// Insert `entries` before the last `</urlset>`, or `None` when there is none.
pub fn insert_entries(xml: &str, entries: &[SitemapEntry]) -> Option<String> {
    let at = xml.rfind(CLOSING_TAG)?;
    let block = entries
        .iter()
        .map(SitemapEntry::to_xml)
        .collect::<Vec<_>>()
        .join("\n");

    let mut out = String::with_capacity(xml.len() + block.len() + 64);
    out.push_str(&xml[..at]);
    out.push_str("\n  ");
    out.push_str(GENERATED_MARKER);
    out.push('\n');
    out.push_str(&block);
    out.push_str("\n\n");
    out.push_str(&xml[at..]);
    Some(out)
}

/// Escape special XML characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
