//! Build orchestration.
//!
//! Runs every keyword group through prompt, generation, rendering and
//! writing, then updates the sitemap once.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Instant,
};

use chrono::Utc;
use landify_core::{Config, KeywordGroup, slugify};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    client::ContentGenerator,
    html::{HtmlError, PageRenderer},
    prompt::PromptBuilder,
    sitemap::SitemapIntegrator,
};

/// Build errors.
///
/// Only failures that make further progress pointless end up here. Per-group
/// generation failures are recorded in [`BuildStats`] instead.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTML generation error.
    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Where a group ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupState {
    /// Not processed yet.
    Pending,
    /// Output already existed and skip-existing was set.
    Skipped,
    /// Generation failed; holds the cause.
    Failed(String),
    /// Page written to the path.
    Written(PathBuf),
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(cause) => write!(f, "failed: {cause}"),
            Self::Written(path) => write!(f, "written to {}", path.display()),
        }
    }
}

/// Outcome for one group.
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub name: String,
    pub slug: String,
    pub state: GroupState,
}

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of pages written.
    pub written: usize,

    /// Number of groups skipped because their page existed.
    pub skipped: usize,

    /// Number of groups whose generation failed.
    pub failed: usize,

    /// Per-group outcomes in input order.
    pub groups: Vec<GroupReport>,

    /// URLs appended to the sitemap.
    pub sitemap_added: Vec<String>,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

impl BuildStats {
    fn record(&mut self, report: GroupReport) {
        match report.state {
            GroupState::Skipped => self.skipped += 1,
            GroupState::Failed(_) => self.failed += 1,
            GroupState::Written(_) => self.written += 1,
            GroupState::Pending => {}
        }
        self.groups.push(report);
    }
}

/// Landing page builder that drives the generation pipeline.
#[derive(Debug)]
pub struct Builder<G> {
    config: Config,
    generator: G,
    prompts: PromptBuilder,
    renderer: PageRenderer,
    output_dir: PathBuf,
    limit: Option<usize>,
    skip_existing: bool,
    update_sitemap: bool,
}

impl<G: ContentGenerator> Builder<G> {
    /// Create a new builder writing pages under `output_dir`.
    #[must_use]
    pub fn new(config: Config, generator: G, output_dir: impl Into<PathBuf>) -> Self {
        let update_sitemap = config.sitemap.enabled;
        Self {
            prompts: PromptBuilder::new(&config),
            renderer: PageRenderer::new(config.clone()),
            config,
            generator,
            output_dir: output_dir.into(),
            limit: None,
            skip_existing: false,
            update_sitemap,
        }
    }

    /// Only process the first `limit` groups.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Leave groups whose page already exists untouched.
    #[must_use]
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// Enable or disable the sitemap update after the run.
    #[must_use]
    pub fn with_sitemap(mut self, enabled: bool) -> Self {
        self.update_sitemap = enabled;
        self
    }

    /// Fix the footer year, for reproducible output.
    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.renderer = PageRenderer::with_year(self.config.clone(), year);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Execute the full build.
    pub fn build(&self, groups: &[KeywordGroup]) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        let groups = match self.limit {
            Some(limit) => &groups[..groups.len().min(limit)],
            None => groups,
        };

        info!(
            groups = groups.len(),
            output = %self.output_dir.display(),
            "starting build"
        );

        fs::create_dir_all(&self.output_dir)?;

        for (idx, group) in groups.iter().enumerate() {
            let name = group.display_name(idx + 1);
            let slug = slugify(&name);
            let mut report = GroupReport {
                name,
                slug,
                state: GroupState::Pending,
            };
            report.state = self.process_group(group, &report.name, &report.slug)?;
            stats.record(report);
        }

        if self.update_sitemap {
            stats.sitemap_added = self.integrate_sitemap();
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            written = stats.written,
            skipped = stats.skipped,
            failed = stats.failed,
            sitemap_added = stats.sitemap_added.len(),
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    fn process_group(&self, group: &KeywordGroup, name: &str, slug: &str) -> Result<GroupState> {
        let output_path = self.renderer.output_path(slug, &self.output_dir);

        if self.skip_existing && output_path.exists() {
            info!(group = name, slug, "skipping existing page");
            return Ok(GroupState::Skipped);
        }

        info!(group = name, slug, "generating page");
        let messages = self.prompts.build(group);

        let content = match self.generator.generate(&messages) {
            Ok(content) => content,
            Err(e) => {
                warn!(group = name, slug, error = %e, "failed to generate content");
                return Ok(GroupState::Failed(e.to_string()));
            }
        };

        let html = self.renderer.render(slug, group, &content)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;

        debug!(path = %output_path.display(), "wrote page");
        Ok(GroupState::Written(output_path))
    }

    /// Sitemap problems never fail the build.
    fn integrate_sitemap(&self) -> Vec<String> {
        let result = SitemapIntegrator::new(&self.config, &self.output_dir)
            .and_then(|integrator| integrator.integrate(Utc::now().date_naive()));

        match result {
            Ok(added) => added,
            Err(e) => {
                warn!(error = %e, "failed to update sitemap");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use landify_core::{GeneratedContent, Hero};
    use tempfile::TempDir;

    use super::*;
    use crate::{client::GenerationError, prompt::ChatMessage};

    /// Returns a fixed heading and counts calls. Fails for groups whose
    /// prompt mentions "Broken".
    #[derive(Default)]
    struct StubGenerator {
        calls: Cell<usize>,
    }

    impl ContentGenerator for StubGenerator {
        fn generate(
            &self,
            messages: &[ChatMessage],
        ) -> std::result::Result<GeneratedContent, GenerationError> {
            self.calls.set(self.calls.get() + 1);
            if messages[1].content.contains("Group name: Broken") {
                return Err(GenerationError::Format {
                    message: "expected value".to_string(),
                    raw: "not json".to_string(),
                });
            }
            Ok(GeneratedContent {
                hero: Some(Hero {
                    heading: Some("Stub Heading".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }
    }

    fn group(name: &str) -> KeywordGroup {
        KeywordGroup {
            name: name.to_string(),
            description: format!("{name} description"),
            primary_keyword: name.to_lowercase(),
            keywords: vec![name.to_lowercase()],
        }
    }

    fn builder<'a>(generator: &'a StubGenerator, output: &Path) -> Builder<&'a StubGenerator> {
        Builder::new(Config::default(), generator, output)
            .with_sitemap(false)
            .with_year(2025)
    }

    #[test]
    fn test_build_writes_pages() {
        let output = TempDir::new().unwrap();
        let generator = StubGenerator::default();

        let stats = builder(&generator, output.path())
            .build(&[group("Hot Tub Removal"), group("Sofa Removal")])
            .unwrap();

        assert_eq!(stats.written, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(generator.calls.get(), 2);

        let page = output.path().join("hot-tub-removal/index.html");
        let html = fs::read_to_string(&page).unwrap();
        assert!(html.contains("<h1>Stub Heading</h1>"));
        assert_eq!(stats.groups[0].state, GroupState::Written(page));
        assert_eq!(stats.groups[1].slug, "sofa-removal");
    }

    #[test]
    fn test_build_empty_groups() {
        let output = TempDir::new().unwrap();
        let target = output.path().join("landing");
        let generator = StubGenerator::default();

        let stats = builder(&generator, &target).build(&[]).unwrap();

        assert_eq!(stats.written, 0);
        assert!(stats.groups.is_empty());
        assert!(target.is_dir());
        assert_eq!(generator.calls.get(), 0);
    }

    #[test]
    fn test_failed_group_does_not_stop_batch() {
        let output = TempDir::new().unwrap();
        let generator = StubGenerator::default();

        let stats = builder(&generator, output.path())
            .build(&[group("Broken"), group("Hot Tub Removal")])
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.written, 1);
        assert!(matches!(&stats.groups[0].state, GroupState::Failed(cause) if cause.contains("not valid")));
        assert!(!output.path().join("broken").exists());
        assert!(output.path().join("hot-tub-removal/index.html").exists());
    }

    #[test]
    fn test_limit() {
        let output = TempDir::new().unwrap();
        let generator = StubGenerator::default();

        let stats = builder(&generator, output.path())
            .with_limit(Some(1))
            .build(&[group("First"), group("Second"), group("Third")])
            .unwrap();

        assert_eq!(stats.groups.len(), 1);
        assert_eq!(generator.calls.get(), 1);
        assert!(!output.path().join("second").exists());
    }

    #[test]
    fn test_skip_existing() {
        let output = TempDir::new().unwrap();
        let existing = output.path().join("hot-tub-removal/index.html");
        fs::create_dir_all(existing.parent().unwrap()).unwrap();
        fs::write(&existing, "hand edited").unwrap();

        let generator = StubGenerator::default();
        let stats = builder(&generator, output.path())
            .skip_existing(true)
            .build(&[group("Hot Tub Removal")])
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(generator.calls.get(), 0);
        assert_eq!(fs::read_to_string(&existing).unwrap(), "hand edited");

        // without the flag the page is regenerated
        let stats = builder(&generator, output.path())
            .build(&[group("Hot Tub Removal")])
            .unwrap();
        assert_eq!(stats.written, 1);
        assert_ne!(fs::read_to_string(&existing).unwrap(), "hand edited");
    }

    #[test]
    fn test_unnamed_group_slug_from_position() {
        let output = TempDir::new().unwrap();
        let generator = StubGenerator::default();

        let stats = builder(&generator, output.path())
            .build(&[KeywordGroup::default()])
            .unwrap();

        assert_eq!(stats.groups[0].name, "Group 1");
        assert_eq!(stats.groups[0].slug, "group-1");
        assert!(output.path().join("group-1/index.html").exists());
    }

    #[test]
    fn test_unnamed_groups_do_not_overwrite_each_other() {
        let output = TempDir::new().unwrap();
        let generator = StubGenerator::default();

        let stats = builder(&generator, output.path())
            .build(&[KeywordGroup::default(), KeywordGroup::default()])
            .unwrap();

        assert_eq!(stats.written, 2);
        assert_eq!(stats.groups[1].slug, "group-2");

        let mut dirs: Vec<_> = fs::read_dir(output.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        dirs.sort();
        assert_eq!(dirs, vec!["group-1", "group-2"]);
    }

    #[test]
    fn test_sitemap_updated_once() {
        let root = TempDir::new().unwrap();
        let landing = root.path().join("landing");
        let sitemap = root.path().join("sitemap.xml");
        fs::write(&sitemap, "<urlset>\n</urlset>\n").unwrap();

        let generator = StubGenerator::default();
        let stats = Builder::new(Config::default(), &generator, &landing)
            .build(&[group("Hot Tub Removal"), group("Sofa Pickup")])
            .unwrap();

        assert_eq!(stats.sitemap_added.len(), 2);
        let xml = fs::read_to_string(&sitemap).unwrap();
        assert_eq!(xml.matches("<!-- Generated Landing Pages -->").count(), 1);
        assert!(xml.contains("<loc>https://grimetodime.com/landing/hot-tub-removal/</loc>"));
    }

    #[test]
    fn test_missing_sitemap_is_not_fatal() {
        let root = TempDir::new().unwrap();
        let landing = root.path().join("landing");

        let generator = StubGenerator::default();
        let stats = Builder::new(Config::default(), &generator, &landing)
            .build(&[group("Hot Tub Removal")])
            .unwrap();

        assert_eq!(stats.written, 1);
        assert!(stats.sitemap_added.is_empty());
    }

    #[test]
    fn test_write_error_aborts() {
        let output = TempDir::new().unwrap();
        // a file where the page directory should go
        fs::write(output.path().join("hot-tub-removal"), "").unwrap();

        let generator = StubGenerator::default();
        let result = builder(&generator, output.path()).build(&[group("Hot Tub Removal")]);
        assert!(matches!(result, Err(BuildError::Io(_))));
    }

    #[test]
    fn test_group_state_display() {
        assert_eq!(GroupState::Pending.to_string(), "pending");
        assert_eq!(GroupState::Skipped.to_string(), "skipped");
        assert_eq!(
            GroupState::Failed("timeout".to_string()).to_string(),
            "failed: timeout"
        );
    }
}
