//! Landing page rendering.
//!
//! Merges a keyword group and its generated copy into the landing template.
//! Rendering is pure: the same inputs always produce the same bytes.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use landify_core::{Config, Feature, GeneratedContent, KeywordGroup, config::ServiceArea};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::template::{TemplateContext, TemplateError, TemplateRegistry, escape_html};

/// Icons assigned to cards by position.
pub const CARD_ICONS: [&str; 6] = [
    "fa-tv",
    "fa-recycle",
    "fa-couch",
    "fa-box",
    "fa-bolt",
    "fa-calendar-check",
];

const MAX_BULLETS: usize = 3;
const MAX_FEATURES: usize = 3;
const MAX_PRICING: usize = 2;
const MAX_FAQ: usize = 4;

/// HTML generation errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// JSON-LD serialization error.
    #[error("JSON-LD error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for HTML generation.
pub type Result<T> = std::result::Result<T, HtmlError>;

/// Landing page renderer.
#[derive(Debug)]
pub struct PageRenderer {
    templates: TemplateRegistry,
    config: Config,
    year: i32,
}

impl PageRenderer {
    /// Create a renderer stamping the current year into the footer.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_year(config, Utc::now().year())
    }

    #[must_use]
    pub fn with_year(config: Config, year: i32) -> Self {
        Self {
            templates: TemplateRegistry::new(),
            config,
            year,
        }
    }

    /// Render the landing page for `group` at `slug`.
    pub fn render(
        &self,
        slug: &str,
        group: &KeywordGroup,
        content: &GeneratedContent,
    ) -> Result<String> {
        debug!(slug, "rendering landing page");

        let site = &self.config.site;
        let name = group.name.as_str();
        let hero = content.hero.clone().unwrap_or_default();
        let form = content.quote_form.clone().unwrap_or_default();
        let cta = content.closing_cta.clone().unwrap_or_default();

        let hero_heading = hero.heading.as_deref().unwrap_or(name);
        let cta_label = cta.button_label.as_deref();
        let default_title = format!("{name} | {}", site.name);
        let default_subject = format!("{} Quote Request", or_default(name, "Service"));
        let default_note = format!("Prefer text? Send photos to {}.", site.phone_display);
        let faq_heading = format!("{} FAQ", or_default(name, "Service"));

        let closing_copy = cta
            .closing_copy
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| format!(r#"<p class="closing">{}</p>"#, escape_html(c)))
            .unwrap_or_default();

        let ctx = TemplateContext::new()
            .with_html("tracking_head", self.tracking_head()?)
            .with_html("conversion_script", self.conversion_script(name)?)
            .with_text(
                "meta_description",
                content
                    .meta_description
                    .as_deref()
                    .unwrap_or(&group.description),
            )
            .with_text(
                "page_title",
                content.page_title.as_deref().unwrap_or(&default_title),
            )
            .with_text("canonical_url", &self.config.landing_url(slug))
            .with_text("favicon_url", &site.favicon_url)
            .with_text("hero_image_url", &site.hero_image_url)
            .with_text("logo_url", &site.logo_url)
            .with_text("site_name", &site.name)
            .with_text("phone_href", &site.phone_href)
            .with_text("phone_display", &site.phone_display)
            .with_text("region", &site.region)
            .with_text("form_action", &site.form_action)
            .with_text("thank_you_url", &site.thank_you_url)
            .with_text("year", &self.year.to_string())
            .with_text("hero_heading", hero_heading)
            .with_text(
                "hero_subheading",
                hero.subheading.as_deref().unwrap_or(&group.description),
            )
            .with_html("hero_bullets", bullet_list_html(&hero.bullets))
            .with_text("cta_button_label", cta_label.unwrap_or("Get Free Quote"))
            .with_text("quote_heading", form.heading.as_deref().unwrap_or("Free Quote"))
            .with_text(
                "form_subject",
                form.form_subject.as_deref().unwrap_or(&default_subject),
            )
            .with_text(
                "details_label",
                form.details_label
                    .as_deref()
                    .unwrap_or("What are we removing?"),
            )
            .with_text(
                "details_placeholder",
                form.details_placeholder
                    .as_deref()
                    .unwrap_or("Item details, access notes, photos"),
            )
            .with_text(
                "submit_label",
                form.submit_label.as_deref().unwrap_or("Get My Quote"),
            )
            .with_text("form_note", form.note.as_deref().unwrap_or(&default_note))
            .with_html(
                "what_we_take",
                feature_cards_html(head(&content.what_we_take, MAX_FEATURES)),
            )
            .with_html(
                "how_it_works",
                feature_cards_html(head(&content.how_it_works, MAX_FEATURES)),
            )
            .with_html(
                "pricing",
                feature_cards_html(head(&content.pricing, MAX_PRICING)),
            )
            .with_text("pricing_cta", cta_label.unwrap_or("Check My Price"))
            .with_html("service_areas", service_areas_html(&self.config.service_areas))
            .with_text("faq_heading", &faq_heading)
            .with_html("faq", faq_html(content))
            .with_html("closing_copy", closing_copy)
            .with_text("faq_cta", cta_label.unwrap_or("Book My Pickup"))
            .with_html(
                "service_json_ld",
                script_json(&self.service_json_ld(hero_heading, group, content))?,
            )
            .with_html("faq_json_ld", script_json(&faq_json_ld(content))?);

        Ok(self.templates.render("landing", &ctx)?)
    }

    /// Output path of the page for `slug`.
    pub fn output_path(&self, slug: &str, output_dir: &Path) -> PathBuf {
        output_dir.join(slug).join("index.html")
    }

    fn tracking_head(&self) -> Result<String> {
        let tracking = &self.config.tracking;
        let ctx = TemplateContext::new()
            .with_text("measurement_id", &tracking.measurement_id)
            .with_text("ads_id", &tracking.ads_id)
            .with_text("phone_conversion", &tracking.phone_conversion)
            .with_text("phone_display", &self.config.site.phone_display);
        Ok(self.templates.render("tracking_head", &ctx)?)
    }

    /// Form handling script; the event label is the only per-page value.
    fn conversion_script(&self, group_name: &str) -> Result<String> {
        let tracking = &self.config.tracking;
        let ctx = TemplateContext::new()
            .with_html(
                "event_label",
                js_string_body(or_default(group_name, "Landing Page")),
            )
            .with_text("ads_id", &tracking.ads_id)
            .with_text("lead_conversion", &tracking.lead_conversion);
        Ok(self.templates.render("conversion_script", &ctx)?)
    }

    fn service_json_ld(
        &self,
        hero_heading: &str,
        group: &KeywordGroup,
        content: &GeneratedContent,
    ) -> Value {
        let site = &self.config.site;
        json!({
            "@context": "https://schema.org",
            "@type": "Service",
            "name": hero_heading,
            "serviceType": content.service_type.as_deref().unwrap_or(&group.name),
            "areaServed": self.config.service_area_names(),
            "provider": {
                "@type": "LocalBusiness",
                "name": site.name,
                "telephone": site.phone_href,
                "url": format!("{}/", site.base_url.trim_end_matches('/')),
                "image": site.business_image_url,
            }
        })
    }
}

/// FAQPage JSON-LD built from complete question/answer pairs only.
///
/// Filters before truncating, so an incomplete entry among the first four
/// does not cost a slot. The visible FAQ block truncates without filtering;
/// the two counts can differ.
pub fn faq_json_ld(content: &GeneratedContent) -> Value {
    let entities: Vec<Value> = content
        .complete_faq()
        .take(MAX_FAQ)
        .map(|(question, answer)| {
            json!({
                "@type": "Question",
                "name": question,
                "acceptedAnswer": {"@type": "Answer", "text": answer},
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": entities,
    })
}

/// Hero bullet list items.
pub fn bullet_list_html(items: &[String]) -> String {
    head(items, MAX_BULLETS)
        .iter()
        .map(|item| {
            format!(
                r#"<li><i class="fas fa-check-circle"></i>{}</li>"#,
                escape_html(item)
            )
        })
        .collect()
}

/// Cards with an icon picked by position.
pub fn feature_cards_html(items: &[Feature]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            format!(
                r#"<div class="feature"><h3><i class="fas {}"></i> {}</h3><p>{}</p></div>"#,
                CARD_ICONS[idx % CARD_ICONS.len()],
                escape_html(&item.title),
                escape_html(&item.description)
            )
        })
        .collect()
}

/// Visible FAQ blocks for the first four entries, complete or not.
pub fn faq_html(content: &GeneratedContent) -> String {
    head(&content.faq, MAX_FAQ)
        .iter()
        .map(|item| {
            format!(
                r#"<div class="feature"><h3>{}</h3><p>{}</p></div>"#,
                escape_html(&item.question),
                escape_html(&item.answer)
            )
        })
        .collect()
}

/// Links to the fixed service areas.
pub fn service_areas_html(areas: &[ServiceArea]) -> String {
    areas
        .iter()
        .map(|area| {
            format!(
                r#"<a class="pill chip" href="{}">{}</a>"#,
                escape_html(&area.url),
                escape_html(&area.name)
            )
        })
        .collect()
}

/// Serialize JSON for an inline `<script>` block.
///
/// `<`, `>` and `&` are written as unicode escapes, which keeps the JSON
/// equivalent while making `</script>` impossible inside it.
pub fn script_json(value: &Value) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e"))
}

/// Text safe inside a single-quoted JS string in an HTML document.
fn js_string_body(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    escape_html(&escaped)
}

fn head<T>(items: &[T], n: usize) -> &[T] {
    &items[..items.len().min(n)]
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}
