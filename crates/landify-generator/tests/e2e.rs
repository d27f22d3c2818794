//! End-to-end tests for Landify.
//!
//! These run the whole pipeline against a mock chat-completion endpoint and
//! check the pages and sitemap written to disk.

use std::fs;

use landify_core::{Config, GroupStore};
use landify_generator::{Builder, ChatClient, GroupState};
use mockito::Matcher;
use serde_json::{Value, json};
use tempfile::TempDir;

const GROUPS: &str = r#"{
  "groups": [
    {
      "name": "Hot Tub Removal",
      "description": "Removal of old hot tubs and spas",
      "primary_keyword": "hot tub removal",
      "keywords": ["hot tub removal near me", "spa disposal", "hot tub demolition"]
    },
    {
      "name": "Broken Group",
      "description": "The model answers this one with prose",
      "primary_keyword": "broken",
      "keywords": []
    }
  ]
}"#;

const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://grimetodime.com/</loc>
  </url>
</urlset>
"#;

fn completion(content: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
}

fn hot_tub_copy() -> String {
    json!({
        "page_title": "Hot Tub Removal | Columbia | Grime To Dime",
        "meta_description": "Fast, safe hot tub removal across Howard County.",
        "hero": {
            "heading": "Fast Hot Tub Removal in Howard County",
            "subheading": "We cut, haul and recycle.",
            "bullets": ["Same-day pickup", "Upfront pricing", "Responsible disposal"]
        },
        "what_we_take": [
            {"title": "Hot Tubs", "description": "All sizes"},
            {"title": "Spas", "description": "In-ground and above"},
            {"title": "Covers", "description": "And steps"}
        ],
        "faq": [
            {"question": "How fast?", "answer": "Often same day."},
            {"question": "Do I need to drain it?", "answer": ""},
            {"question": "Do you recycle?", "answer": "Whenever possible."}
        ],
        "closing_cta": {"button_label": "Call Now for Fast Pickup"},
        "service_type": "Hot tub removal"
    })
    .to_string()
}

fn json_ld_blocks(html: &str) -> Vec<Value> {
    let open = r#"<script type="application/ld+json">"#;
    html.match_indices(open)
        .map(|(i, _)| {
            let start = i + open.len();
            let end = start + html[start..].find("</script>").unwrap();
            serde_json::from_str(&html[start..end]).unwrap()
        })
        .collect()
}

#[test]
fn test_hot_tub_pipeline() {
    let mut server = mockito::Server::new();
    let hot_tub = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer e2e-key")
        .match_body(Matcher::Regex("Group name: Hot Tub Removal".to_string()))
        .with_status(200)
        .with_body(completion(&hot_tub_copy()))
        .expect(1)
        .create();
    let broken = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex("Group name: Broken Group".to_string()))
        .with_status(200)
        .with_body(completion("I'm sorry, here is some prose instead of JSON."))
        .expect(1)
        .create();

    let root = TempDir::new().unwrap();
    let groups_path = root.path().join("keyword_groups_for_landing_pages.json");
    fs::write(&groups_path, GROUPS).unwrap();
    fs::write(root.path().join("sitemap.xml"), SITEMAP).unwrap();
    let landing = root.path().join("landing");

    let mut config = Config::default();
    config.generation.endpoint = format!("{}/v1/chat/completions", server.url());

    let store = GroupStore::load(&groups_path).unwrap();
    let client = ChatClient::new(&config.generation)
        .unwrap()
        .with_api_key("e2e-key");

    let stats = Builder::new(config, client, &landing)
        .with_year(2025)
        .build(store.groups())
        .unwrap();

    hot_tub.assert();
    broken.assert();

    assert_eq!(stats.written, 1);
    assert_eq!(stats.failed, 1);
    assert!(matches!(stats.groups[1].state, GroupState::Failed(_)));
    assert!(!landing.join("broken-group").exists());

    let html = fs::read_to_string(landing.join("hot-tub-removal/index.html")).unwrap();
    assert!(html.contains("<title>Hot Tub Removal | Columbia | Grime To Dime</title>"));
    assert!(html.contains("<h1>Fast Hot Tub Removal in Howard County</h1>"));
    assert!(html.contains(
        r#"<link rel="canonical" href="https://grimetodime.com/landing/hot-tub-removal/">"#
    ));
    assert!(html.contains(">Call Now for Fast Pickup</a>"));
    assert!(html.contains(r#"<a class="pill chip" href="/locations/columbia-md/">Columbia</a>"#));

    let blocks = json_ld_blocks(&html);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["@type"], "Service");
    assert_eq!(blocks[0]["serviceType"], "Hot tub removal");
    assert_eq!(blocks[1]["@type"], "FAQPage");
    let faq = blocks[1]["mainEntity"].as_array().unwrap();
    assert_eq!(faq.len(), 2);
    assert_eq!(faq[1]["name"], "Do you recycle?");

    assert_eq!(
        stats.sitemap_added,
        vec!["https://grimetodime.com/landing/hot-tub-removal/".to_string()]
    );
    let sitemap = fs::read_to_string(root.path().join("sitemap.xml")).unwrap();
    assert!(sitemap.contains("<loc>https://grimetodime.com/landing/hot-tub-removal/</loc>"));
    assert!(!sitemap.contains("broken-group"));
}

#[test]
fn test_rerun_with_skip_existing_retries_failures() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion(r#"{"hero": {"heading": "Second Pass"}}"#))
        .expect(1)
        .create();

    let root = TempDir::new().unwrap();
    let landing = root.path().join("landing");
    let existing = landing.join("hot-tub-removal/index.html");
    fs::create_dir_all(existing.parent().unwrap()).unwrap();
    fs::write(&existing, "first pass").unwrap();

    let mut config = Config::default();
    config.generation.endpoint = format!("{}/v1/chat/completions", server.url());
    config.sitemap.enabled = false;

    let groups = GroupStore::parse(GROUPS).unwrap();
    let client = ChatClient::new(&config.generation)
        .unwrap()
        .with_api_key("e2e-key");

    let stats = Builder::new(config, client, &landing)
        .skip_existing(true)
        .build(&groups)
        .unwrap();

    mock.assert();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.written, 1);
    assert_eq!(fs::read_to_string(&existing).unwrap(), "first pass");
    let retried = fs::read_to_string(landing.join("broken-group/index.html")).unwrap();
    assert!(retried.contains("<h1>Second Pass</h1>"));
}

#[test]
fn test_missing_credential_fails_every_group() {
    let root = TempDir::new().unwrap();
    let landing = root.path().join("landing");

    let mut config = Config::default();
    config.generation.api_key_env = "LANDIFY_E2E_UNSET_KEY".to_string();
    config.generation.endpoint = "http://127.0.0.1:9/v1/chat/completions".to_string();
    config.sitemap.enabled = false;

    let groups = GroupStore::parse(GROUPS).unwrap();
    let client = ChatClient::new(&config.generation).unwrap().without_api_key();

    let stats = Builder::new(config, client, &landing).build(&groups).unwrap();

    assert_eq!(stats.failed, 2);
    assert_eq!(stats.written, 0);
    for report in &stats.groups {
        assert!(
            matches!(&report.state, GroupState::Failed(cause) if cause.contains("LANDIFY_E2E_UNSET_KEY"))
        );
    }
    assert!(landing.is_dir());
}
