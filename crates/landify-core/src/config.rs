//! Generator configuration management.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Landify.
///
/// Every section has defaults, so an empty file (or no file at all) yields
/// a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Business and site settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Fixed service footprint rendered on every page.
    #[serde(default = "default_service_areas")]
    pub service_areas: Vec<ServiceArea>,

    /// Analytics and ad conversion identifiers.
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Text generation settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Sitemap integration settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,
}

/// Business and site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Brand name.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Base URL for the site (e.g., "https://example.com").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// URL path segment that holds the landing pages.
    #[serde(default = "default_landing_path")]
    pub landing_path: String,

    /// Phone number in `tel:` form.
    #[serde(default = "default_phone_href")]
    pub phone_href: String,

    /// Phone number as displayed.
    #[serde(default = "default_phone_display")]
    pub phone_display: String,

    /// Region the copy should be localised to.
    #[serde(default = "default_region")]
    pub region: String,

    /// Quote form POST target.
    #[serde(default = "default_form_action")]
    pub form_action: String,

    /// Redirect target after a successful form submission.
    #[serde(default = "default_thank_you_url")]
    pub thank_you_url: String,

    #[serde(default = "default_logo_url")]
    pub logo_url: String,

    #[serde(default = "default_favicon_url")]
    pub favicon_url: String,

    #[serde(default = "default_hero_image_url")]
    pub hero_image_url: String,

    /// Image used for the LocalBusiness provider in JSON-LD.
    #[serde(default = "default_business_image_url")]
    pub business_image_url: String,
}

/// A linked service area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceArea {
    /// Display name (e.g., "Columbia").
    pub name: String,

    /// Site-relative URL of the location page.
    pub url: String,
}

/// Analytics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Google Analytics measurement id.
    #[serde(default = "default_measurement_id")]
    pub measurement_id: String,

    /// Google Ads account id.
    #[serde(default = "default_ads_id")]
    pub ads_id: String,

    /// Ads conversion label for phone calls.
    #[serde(default = "default_phone_conversion")]
    pub phone_conversion: String,

    /// Ads conversion label for form leads.
    #[serde(default = "default_lead_conversion")]
    pub lead_conversion: String,
}

/// Chat-completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Chat-completion endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Maximum number of keywords embedded in the prompt.
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

/// Sitemap integration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Whether to update the sitemap after a build.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Sitemap location. Relative to the output directory's parent when unset.
    #[serde(default)]
    pub path: Option<String>,

    /// `<changefreq>` for appended entries.
    #[serde(default = "default_changefreq")]
    pub changefreq: String,

    /// `<priority>` for appended entries.
    #[serde(default = "default_priority")]
    pub priority: f32,

    /// Landing directories that are maintained by hand.
    #[serde(default = "default_sitemap_exclude")]
    pub exclude: Vec<String>,
}

// Default value functions
fn default_site_name() -> String {
    "Grime To Dime".to_string()
}

fn default_base_url() -> String {
    "https://grimetodime.com".to_string()
}

fn default_landing_path() -> String {
    "landing".to_string()
}

fn default_phone_href() -> String {
    "+14103006743".to_string()
}

fn default_phone_display() -> String {
    "(410) 300-6743".to_string()
}

fn default_region() -> String {
    "Howard County, Maryland".to_string()
}

fn default_form_action() -> String {
    "https://formspree.io/f/meoovajl".to_string()
}

fn default_thank_you_url() -> String {
    "https://grimetodime.com/thank-you.html".to_string()
}

fn default_logo_url() -> String {
    "/images/optimized/Faviconmaster-optimized.webp".to_string()
}

fn default_favicon_url() -> String {
    "/images/Faviconmaster.png".to_string()
}

fn default_hero_image_url() -> String {
    "/images/optimized/warehouse-after-junk-removal-hero-800w.webp".to_string()
}

fn default_business_image_url() -> String {
    "https://grimetodime.com/images/MASTERPARENT.png".to_string()
}

fn default_service_areas() -> Vec<ServiceArea> {
    [
        ("Ellicott City", "/locations/ellicott-city-md/"),
        ("Columbia", "/locations/columbia-md/"),
        ("Elkridge", "/locations/elkridge-md/"),
        ("Clarksville", "/locations/clarksville-md/"),
        ("Laurel", "/locations/laurel-md/"),
        ("Savage", "/locations/savage-md/"),
        ("Catonsville", "/locations/catonsville-md/"),
    ]
    .into_iter()
    .map(|(name, url)| ServiceArea {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}

fn default_measurement_id() -> String {
    "G-KGQDKQFZNF".to_string()
}

fn default_ads_id() -> String {
    "AW-11553122519".to_string()
}

fn default_phone_conversion() -> String {
    "JftTCI3O64QbENfR-oQr".to_string()
}

fn default_lead_conversion() -> String {
    "0KjoCPG_6oQbENfR-oQr".to_string()
}

fn default_endpoint() -> String {
    "https://api.x.ai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "grok-4-fast".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "XAI_API_KEY".to_string()
}

fn default_max_keywords() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_changefreq() -> String {
    "monthly".to_string()
}

fn default_priority() -> f32 {
    0.7
}

fn default_sitemap_exclude() -> Vec<String> {
    [
        "appliance-removal",
        "basement-cleanout",
        "construction-debris-removal",
        "estate-cleanout",
        "exact",
        "garage-cleanout",
        "hot-tub",
        "local",
        "mattress-disposal",
        "sofa-removal",
        "storage-unit-cleanout",
        "treadmill-removal",
        "tv-disposal",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            service_areas: default_service_areas(),
            tracking: TrackingConfig::default(),
            generation: GenerationConfig::default(),
            sitemap: SitemapConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            base_url: default_base_url(),
            landing_path: default_landing_path(),
            phone_href: default_phone_href(),
            phone_display: default_phone_display(),
            region: default_region(),
            form_action: default_form_action(),
            thank_you_url: default_thank_you_url(),
            logo_url: default_logo_url(),
            favicon_url: default_favicon_url(),
            hero_image_url: default_hero_image_url(),
            business_image_url: default_business_image_url(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            measurement_id: default_measurement_id(),
            ads_id: default_ads_id(),
            phone_conversion: default_phone_conversion(),
            lead_conversion: default_lead_conversion(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
            max_keywords: default_max_keywords(),
        }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            changefreq: default_changefreq(),
            priority: default_priority(),
            exclude: default_sitemap_exclude(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration using the config crate, layering `LANDIFY__*`
    /// environment overrides on top of an optional file.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("LANDIFY").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.name.trim().is_empty() {
            return Err(CoreError::config("site.name cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(CoreError::config(
                "generation.temperature must be between 0 and 2",
            ));
        }

        if self.generation.timeout_secs == 0 {
            return Err(CoreError::config(
                "generation.timeout_secs must be greater than 0",
            ));
        }

        if !(0.0..=1.0).contains(&self.sitemap.priority) {
            return Err(CoreError::config("sitemap.priority must be between 0 and 1"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        if self.service_areas.is_empty() {
            tracing::warn!("no service areas configured");
        }

        Ok(())
    }

    /// Public URL of the landing page for `slug`, with trailing slash.
    pub fn landing_url(&self, slug: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let prefix = self.site.landing_path.trim_matches('/');
        if prefix.is_empty() {
            format!("{base}/{slug}/")
        } else {
            format!("{base}/{prefix}/{slug}/")
        }
    }

    /// Names of the configured service areas, in order.
    pub fn service_area_names(&self) -> Vec<&str> {
        self.service_areas.iter().map(|a| a.name.as_str()).collect()
    }
}
