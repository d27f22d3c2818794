//! Check command - validate configuration and keyword groups

use std::{collections::BTreeMap, path::Path};

use color_eyre::eyre::{Result, bail};
use landify_core::{Config, GroupStore, KeywordGroup, slugify};
use landify_generator::sitemap::ChangeFreq;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration and the keyword groups file.
pub fn run(config_path: &Path, groups_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, ?groups_path, strict, "Checking configuration and groups");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    match Config::load_with_env(config_path) {
        Ok(config) => {
            println!("  ✓ Configuration valid");
            check_config_values(&config, &mut result);
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
        }
    }

    println!("\nChecking keyword groups...");
    match GroupStore::load(groups_path) {
        Ok(store) => {
            println!("  ✓ {} group(s) loaded", store.len());
            for warning in quick_validate(store.groups()) {
                result.add_warning(warning);
            }
        }
        Err(e) => {
            result.add_error(format!("Keyword groups error: {e}"));
            println!("  ✗ Keyword groups invalid: {e}");
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Quick validation for the build command.
///
/// Returns non-fatal warnings about the groups: slugs shared by several
/// groups (later pages overwrite earlier ones), unnamed groups and groups
/// without keywords.
pub fn quick_validate(groups: &[KeywordGroup]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (slug, names) in slug_collisions(groups) {
        warnings.push(format!(
            "Slug '{slug}' is shared by {} groups ({}); only the last page is kept",
            names.len(),
            names.join(", ")
        ));
    }

    for (idx, group) in groups.iter().enumerate() {
        let name = group.display_name(idx + 1);
        if group.name.trim().is_empty() {
            warnings.push(format!("{name} has no name"));
        }
        if group.keywords.is_empty() {
            warnings.push(format!("{name} has no keywords"));
        }
    }

    warnings
}

/// Slugs produced by more than one group, with the groups' names.
fn slug_collisions(groups: &[KeywordGroup]) -> BTreeMap<String, Vec<String>> {
    let mut by_slug: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (idx, group) in groups.iter().enumerate() {
        let name = group.display_name(idx + 1);
        by_slug.entry(slugify(&name)).or_default().push(name);
    }
    by_slug.retain(|_, names| names.len() > 1);
    by_slug
}

/// Check configuration values that parse but will not work well.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if !config.site.base_url.starts_with("http://") && !config.site.base_url.starts_with("https://")
    {
        result.add_warning(format!(
            "site.base_url '{}' is not an absolute http(s) URL",
            config.site.base_url
        ));
    }

    if std::env::var(&config.generation.api_key_env).is_err() {
        result.add_warning(format!(
            "{} is not set; every generation call will fail",
            config.generation.api_key_env
        ));
    }

    if let Err(e) = config.sitemap.changefreq.parse::<ChangeFreq>() {
        result.add_error(format!("sitemap: {e}"));
    }

    if config.service_areas.is_empty() {
        result.add_warning("No service areas configured");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn group(name: &str, keywords: &[&str]) -> KeywordGroup {
        KeywordGroup {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_slug_collisions() {
        let groups = vec![
            group("Hot Tub Removal", &["a"]),
            group("hot-tub removal!", &["b"]),
            group("Sofa Removal", &["c"]),
        ];

        let collisions = slug_collisions(&groups);
        assert_eq!(collisions.len(), 1);
        assert_eq!(
            collisions["hot-tub-removal"],
            vec!["Hot Tub Removal".to_string(), "hot-tub removal!".to_string()]
        );
    }

    #[test]
    fn test_unnamed_groups_do_not_collide() {
        let groups = vec![group("", &["a"]), group("", &["b"])];
        assert!(slug_collisions(&groups).is_empty());

        // an explicit name can still clash with a positional label
        let groups = vec![group("", &["a"]), group("Group 1", &["b"])];
        assert_eq!(
            slug_collisions(&groups)["group-1"],
            vec!["Group 1".to_string(), "Group 1".to_string()]
        );
    }

    #[test]
    fn test_quick_validate() {
        let groups = vec![group("Hot Tub Removal", &["a"]), group("", &[])];

        let warnings = quick_validate(&groups);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.contains(&"Group 2 has no name".to_string()));
        assert!(warnings.contains(&"Group 2 has no keywords".to_string()));
    }

    #[test]
    fn test_quick_validate_clean() {
        let groups = vec![group("Hot Tub Removal", &["a"]), group("Sofa Removal", &["b"])];
        assert!(quick_validate(&groups).is_empty());
    }

    #[test]
    fn test_check_config_values() {
        let mut config = Config::default();
        config.site.base_url = "grimetodime.com".to_string();
        config.generation.api_key_env = "LANDIFY_CHECK_UNSET_KEY".to_string();
        config.sitemap.changefreq = "fortnightly".to_string();

        let mut result = ValidationResult::default();
        check_config_values(&config, &mut result);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[1].contains("LANDIFY_CHECK_UNSET_KEY"));
    }

    #[test]
    fn test_run_missing_groups_fails() {
        let root = TempDir::new().unwrap();
        let result = run(
            &root.path().join("landify.toml"),
            &root.path().join("groups.json"),
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_run_with_valid_files() {
        let root = TempDir::new().unwrap();
        let groups = root.path().join("groups.json");
        fs::write(
            &groups,
            r#"{"groups": [{"name": "Hot Tub Removal", "keywords": ["hot tub removal"]}]}"#,
        )
        .unwrap();

        run(&root.path().join("landify.toml"), &groups, false).unwrap();
    }

    #[test]
    fn test_run_strict_fails_on_collisions() {
        let root = TempDir::new().unwrap();
        let groups = root.path().join("groups.json");
        fs::write(
            &groups,
            r#"{"groups": [
                {"name": "Hot Tub Removal", "keywords": ["a"]},
                {"name": "Hot Tub  Removal", "keywords": ["b"]}
            ]}"#,
        )
        .unwrap();

        run(&root.path().join("landify.toml"), &groups, false).unwrap();
        assert!(run(&root.path().join("landify.toml"), &groups, true).is_err());
    }
}
