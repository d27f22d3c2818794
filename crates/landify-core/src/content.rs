//! Generated page copy.
//!
//! Every field is optional. The renderer decides what an absent value
//! falls back to, so a sparse or partially-filled response still renders.

use serde::{Deserialize, Deserializer, Serialize};

/// Page copy returned by the text generator for one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedContent {
    pub page_title: Option<String>,
    pub meta_description: Option<String>,
    pub hero: Option<Hero>,
    pub quote_form: Option<QuoteForm>,
    #[serde(deserialize_with = "null_as_default")]
    pub what_we_take: Vec<Feature>,
    #[serde(deserialize_with = "null_as_default")]
    pub how_it_works: Vec<Feature>,
    #[serde(deserialize_with = "null_as_default")]
    pub pricing: Vec<Feature>,
    #[serde(deserialize_with = "null_as_default")]
    pub faq: Vec<FaqItem>,
    pub closing_cta: Option<ClosingCta>,
    /// Short phrase used as the JSON-LD `serviceType`.
    pub service_type: Option<String>,
}

/// Above-the-fold copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hero {
    pub heading: Option<String>,
    pub subheading: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

/// Labels for the quote request form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteForm {
    pub heading: Option<String>,
    pub details_label: Option<String>,
    pub details_placeholder: Option<String>,
    pub submit_label: Option<String>,
    pub note: Option<String>,
    /// Subject line for the hidden email subject field.
    pub form_subject: Option<String>,
}

/// A titled card used by the feature, process and pricing sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// One question/answer pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(deserialize_with = "null_as_default")]
    pub answer: String,
}

impl FaqItem {
    /// Trimmed question and answer, if both are non-empty.
    pub fn complete(&self) -> Option<(&str, &str)> {
        let question = self.question.trim();
        let answer = self.answer.trim();
        (!question.is_empty() && !answer.is_empty()).then_some((question, answer))
    }
}

/// Final call to action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosingCta {
    pub button_label: Option<String>,
    pub closing_copy: Option<String>,
}

/// Treat an explicit `null` like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl GeneratedContent {
    /// Parse content from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// FAQ entries with both a question and an answer.
    pub fn complete_faq(&self) -> impl Iterator<Item = (&str, &str)> {
        self.faq.iter().filter_map(FaqItem::complete)
    }
}
