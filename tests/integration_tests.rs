//! Integration tests for Paper Insight
//!
//! These tests drive the full pipeline against mock HTTP services standing in
//! for arXiv, the summarization model and the chat-completion endpoint.

use mockito::Matcher;
use paper_insight::agents::{
    InsightSynthesizer, SearchClient, Summarizer, INSIGHT_FAILED_MARKER, NO_SUMMARIES_MARKER,
    NO_TEXT_MARKER, OFFLINE_PREFIX,
};
use paper_insight::config::{Config, Credentials};
use paper_insight::models::PlaceholderKind;
use paper_insight::pipeline::Pipeline;
use serde_json::json;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: search_query=all:ethics</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <updated>2024-01-02T00:00:00Z</updated>
    <published>2024-01-02T00:00:00Z</published>
    <title>Fairness Audits for
      Language Models</title>
    <summary>We audit large language models for fairness. Audits reveal
      systematic gaps. We propose a remedy.</summary>
    <author><name>Ada Lovelace</name></author>
    <link href="http://arxiv.org/abs/2401.00001v1" rel="alternate" type="text/html"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00002v1</id>
    <updated>2024-01-03T00:00:00Z</updated>
    <published>2024-01-03T00:00:00Z</published>
    <title>Accountability in Autonomous Systems</title>
    <summary>Autonomous systems need accountability. We define it formally.</summary>
    <author><name>Alan Turing</name></author>
    <link href="http://arxiv.org/abs/2401.00002v1" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2024-01-01T00:00:00Z</updated>
</feed>"#;

/// Configuration pointing every stage at `server`, with no backoff delay
fn config_for(server: &mockito::ServerGuard) -> Config {
    let mut config = Config::default();
    config.search.base_url = format!("{}/api/query", server.url());
    config.search.backoff_factor = 0.0;
    config.search.max_retries = 2;
    config.summarizer.endpoint = server.url();
    config.insight.endpoint = format!("{}/v1", server.url());
    config
}

#[tokio::test]
async fn test_pipeline_end_to_end_with_remote_models() {
    let mut server = mockito::Server::new_async().await;

    let search = server
        .mock("GET", "/api/query")
        .match_query(Matcher::UrlEncoded("search_query".into(), "ai ethics".into()))
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(FEED)
        .expect(1)
        .create_async()
        .await;

    let summarize = server
        .mock("POST", "/models/facebook/bart-large-cnn")
        .match_header("authorization", "Bearer hf_test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"summary_text": " Model summary. "}]"#)
        .expect(2)
        .create_async()
        .await;

    let chat = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer hf_test")
        .match_body(Matcher::Regex("Model summary\\.".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{"message": {"role": "assistant", "content": "\n Both papers stress oversight. \n"}}]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&server);
    let pipeline = Pipeline::from_config(&config, &Credentials::with_huggingface("hf_test")).unwrap();
    let report = pipeline.run("ai ethics", Some(2)).await;

    search.assert_async().await;
    summarize.assert_async().await;
    chat.assert_async().await;

    assert_eq!(report.papers.len(), 2);
    let first = &report.papers[0].record;
    assert_eq!(first.title, "Fairness Audits for Language Models");
    assert_eq!(first.url, "http://arxiv.org/abs/2401.00001v1");
    assert_eq!(first.authors, vec!["Ada Lovelace".to_string()]);
    assert!(report.summaries().all(|s| s == "Model summary."));
    assert_eq!(report.insight, "Both papers stress oversight.");
    assert!(!report.is_degraded());
}

#[tokio::test]
async fn test_pipeline_without_credentials_uses_offline_fallbacks() {
    let mut server = mockito::Server::new_async().await;
    let _search = server
        .mock("GET", "/api/query")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(FEED)
        .create_async()
        .await;
    let models = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server), &Credentials::none()).unwrap();
    let report = pipeline.run("ai ethics", None).await;

    models.assert_async().await;
    assert_eq!(report.papers.len(), 2);
    assert_eq!(
        report.papers[0].summary,
        "We audit large language models for fairness. Audits reveal systematic gaps."
    );
    assert!(report.insight.starts_with(OFFLINE_PREFIX));
    assert!(report.insight.contains("Autonomous systems need accountability."));
}

#[tokio::test]
async fn test_search_retries_then_reports_connection_error() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/api/query")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let config = config_for(&server);
    let client = SearchClient::from_config(&config.search).unwrap();
    let records = client.search("ai ethics", 3).await;

    search.assert_async().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].placeholder, Some(PlaceholderKind::ConnectionError));
    assert!(records[0].title.contains("Connection Error"));
}

#[tokio::test]
async fn test_search_empty_feed_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/api/query")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(EMPTY_FEED)
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&server);
    let records = SearchClient::from_config(&config.search)
        .unwrap()
        .search("nothing matches this", 5)
        .await;

    search.assert_async().await;
    assert_eq!(records.len(), 1);
    assert!(records[0].title.contains("No Results Found"));
}

#[tokio::test]
async fn test_failed_insight_call_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let chat = server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&server);
    let synthesizer =
        InsightSynthesizer::new(&config.insight, &Credentials::with_huggingface("hf_test"));

    assert_eq!(
        synthesizer.synthesize(&["One summary."]).await,
        INSIGHT_FAILED_MARKER
    );
    chat.assert_async().await;
}

#[tokio::test]
async fn test_stage_markers() {
    let summarizer = Summarizer::offline();
    assert_eq!(summarizer.summarize("   ").await, NO_TEXT_MARKER);

    let empty: Vec<String> = Vec::new();
    assert_eq!(
        InsightSynthesizer::offline().synthesize(&empty).await,
        NO_SUMMARIES_MARKER
    );
}

/// Live scenario against the real arXiv API and, when a token is set, the
/// Hugging Face endpoints. Run with `cargo test -- --ignored`.
#[tokio::test]
#[ignore]
async fn test_live_artificial_intelligence_ethics() {
    let pipeline = Pipeline::from_config(&Config::default(), &Credentials::from_env()).unwrap();
    let report = pipeline.run("artificial intelligence ethics", Some(1)).await;

    assert_eq!(report.papers.len(), 1);
    let entry = &report.papers[0];
    assert!(!entry.summary.is_empty());
    if !entry.record.is_placeholder() {
        assert!(entry.summary.chars().count() <= entry.record.summary.chars().count());
    }
    assert!(report.insight.chars().count() > 10);
}
