//! Prompt construction for page copy generation.

use landify_core::{Config, KeywordGroup};
use serde::{Deserialize, Serialize};

/// Line used when a group has no keywords.
pub const NO_KEYWORDS_LINE: &str = "- (keywords unavailable)";

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One chat-completion message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// JSON layout the model is asked to return.
const RESPONSE_SHAPE: &str = r#"{
  "page_title": "",          // <= 60 characters, format "Service | City | Brand"
  "meta_description": "",    // 140-165 characters, compelling summary
  "hero": {"heading": "", "subheading": "", "bullets": ["", "", ""]},
  "quote_form": {
    "heading": "",
    "details_label": "",
    "details_placeholder": "",
    "submit_label": "",
    "note": "",
    "form_subject": ""       // short subject for the hidden email subject field
  },
  "what_we_take": [{"title": "", "description": ""}, {"title": "", "description": ""}, {"title": "", "description": ""}],
  "how_it_works": [{"title": "", "description": ""}, {"title": "", "description": ""}, {"title": "", "description": ""}],
  "pricing": [{"title": "", "description": ""}, {"title": "", "description": ""}],
  "faq": [
    {"question": "", "answer": ""},
    {"question": "", "answer": ""},
    {"question": "", "answer": ""},
    {"question": "", "answer": ""}
  ],
  "closing_cta": {"button_label": "", "closing_copy": ""},
  "service_type": ""         // short phrase for JSON-LD serviceType
}"#;

/// Builds the two-message prompt for a keyword group.
///
/// Pure: the output depends only on the group and the site settings.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    brand: String,
    region: String,
    cities: Vec<String>,
    max_keywords: usize,
}

impl PromptBuilder {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            brand: config.site.name.clone(),
            region: config.site.region.clone(),
            cities: config
                .service_areas
                .iter()
                .map(|a| a.name.clone())
                .collect(),
            max_keywords: config.generation.max_keywords,
        }
    }

    /// System instructions first, user request second.
    pub fn build(&self, group: &KeywordGroup) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(self.user_prompt(group)),
        ]
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a senior conversion copywriter and SEO strategist for {brand}, a junk removal company. \
             Given structured keyword group data, craft landing page copy that is conversion focused, \
             locally relevant to {region}, and optimized for paid search and SEO. \
             Return well-structured JSON that a renderer can drop into an HTML template.",
            brand = self.brand,
            region = self.region,
        )
    }

    fn user_prompt(&self, group: &KeywordGroup) -> String {
        let cities = if self.cities.is_empty() {
            String::new()
        } else {
            format!(" and surrounding cities ({})", self.cities.join(", "))
        };

        format!(
            "We are launching programmatic landing pages for {brand}, a junk removal company serving {region}.

Please write conversion-focused copy for a landing page targeting the following service theme:

Group name: {name}
Description: {description}
Primary keyword: {primary}
Supporting keywords (sample):
{keywords}

Requirements:
- Tone: confident, friendly, trustworthy local service pros.
- Audience: homeowners, renters, and property managers searching for this specific service.
- Highlight same-day or next-day availability when appropriate, upfront pricing, and responsible disposal.
- Emphasize local expertise in {region}{cities}.
- Include strong calls to action that encourage calling or requesting a quote.
- Button labels should be action-focused (e.g., \"Call Now for Fast Pickup\", \"Get My Quote Now\") and never include phone numbers or placeholders.
- Keep language unique to this service; do not repeat wording verbatim between sections.
- Avoid guarantees you cannot back up (no \"free\" unless the keywords call for it).

Return valid JSON with this structure:
{shape}

The text should read naturally when rendered into sections. Use American English spelling.
",
            brand = self.brand,
            region = self.region,
            cities = cities,
            name = group.name,
            description = group.description,
            primary = group.primary_keyword,
            keywords = keyword_bullets(&group.keywords, self.max_keywords),
            shape = RESPONSE_SHAPE,
        )
    }
}

/// The first `max` keywords as a `- keyword` list.
pub fn keyword_bullets(keywords: &[String], max: usize) -> String {
    if keywords.is_empty() || max == 0 {
        return NO_KEYWORDS_LINE.to_string();
    }

    keywords
        .iter()
        .take(max)
        .map(|kw| format!("- {kw}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(keywords: Vec<String>) -> KeywordGroup {
        KeywordGroup {
            name: "Hot Tub Removal".to_string(),
            description: "Removal of old hot tubs and spas".to_string(),
            primary_keyword: "hot tub removal".to_string(),
            keywords,
        }
    }

    #[test]
    fn test_role_order() {
        let builder = PromptBuilder::new(&Config::default());
        let messages = builder.build(&group(vec!["spa disposal".to_string()]));

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[0].content.contains("Grime To Dime"));
        assert!(messages[1].content.contains("Group name: Hot Tub Removal"));
        assert!(messages[1].content.contains("Primary keyword: hot tub removal"));
        assert!(messages[1].content.contains("- spa disposal"));
        assert!(messages[1].content.contains("Ellicott City"));
    }

    #[test]
    fn test_keywords_truncated_to_twenty() {
        let keywords: Vec<String> = (1..=25).map(|i| format!("keyword {i}")).collect();
        let builder = PromptBuilder::new(&Config::default());
        let messages = builder.build(&group(keywords));
        let user = &messages[1].content;

        assert!(user.contains("- keyword 1\n"));
        assert!(user.contains("- keyword 20\n"));
        assert!(!user.contains("- keyword 21"));
    }

    #[test]
    fn test_empty_keywords_placeholder() {
        let builder = PromptBuilder::new(&Config::default());
        let messages = builder.build(&group(Vec::new()));
        assert!(messages[1].content.contains(NO_KEYWORDS_LINE));
    }

    #[test]
    fn test_keyword_bullets() {
        let keywords = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(keyword_bullets(&keywords, 2), "- a\n- b");
        assert_eq!(keyword_bullets(&[], 20), NO_KEYWORDS_LINE);
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(ChatMessage::system("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "hi"}));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let builder = PromptBuilder::new(&Config::default());
        let g = group(vec!["spa disposal".to_string()]);
        assert_eq!(builder.build(&g), builder.build(&g));
    }
}
