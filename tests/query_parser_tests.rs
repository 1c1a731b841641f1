//! # Query Parser Tests
//!
//! The chat-completion endpoint is a wiremock server.

use std::time::Duration;

use anyhow::Result;
use pulseforge::config::{LlmConfig, RetryConfig};
use pulseforge::query_parser::{FixtureType, ParsedQuery, QueryParser};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

fn parser(server: &MockServer, max_attempts: u32) -> Result<QueryParser> {
    let mut config = LlmConfig::new("llm-key");
    config.api_url = format!("{}{COMPLETIONS_PATH}", server.uri());
    config.timeout = Duration::from_secs(5);
    config.retry = RetryConfig {
        max_attempts,
        base_retry_delay_ms: 1,
        max_retry_delay_ms: 5,
    };
    QueryParser::new(config)
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or_default()
}

#[tokio::test]
async fn test_prose_wrapped_json_is_parsed() -> Result<()> {
    let server = MockServer::start().await;
    let reply = "Here you go:\n```json\n{\"teams\": [\"Barcelona\"], \"fixture_type\": \"last\"}\n```";
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(completion(reply))
        .mount(&server)
        .await;
    let parser = parser(&server, 3)?;

    let outcome = parser.parse("Барселона последний матч", Some("football")).await;
    assert!(!outcome.failed);
    assert_eq!(outcome.query.teams, vec!["Barcelona".to_string()]);
    assert_eq!(outcome.query.fixture_type, Some(FixtureType::Last));
    assert_eq!(request_count(&server).await, 1);
    Ok(())
}

#[tokio::test]
async fn test_request_shape() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer llm-key"))
        .and(body_partial_json(json!({"stream": false, "max_tokens": 300})))
        .respond_with(completion("{}"))
        .expect(1)
        .mount(&server)
        .await;
    let parser = parser(&server, 1)?;

    parser.parse("NBA today", None).await;

    let requests = server.received_requests().await.unwrap_or_default();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
    assert_eq!(body["messages"][0]["role"], "user");
    assert!(body["messages"][0]["content"].as_str().unwrap_or_default().contains("NBA today"));
    Ok(())
}

#[tokio::test]
async fn test_recovers_after_a_garbled_reply() -> Result<()> {
    let server = MockServer::start().await;
    // Mounted first, matched first until used up
    Mock::given(method("POST"))
        .respond_with(completion("I am not sure what you mean"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(completion("{\"leagues\": [\"Premier League\"]}"))
        .mount(&server)
        .await;
    let parser = parser(&server, 3)?;

    let outcome = parser.parse("premier league", None).await;
    assert!(!outcome.failed);
    assert_eq!(outcome.query.leagues, vec!["Premier League".to_string()]);
    assert_eq!(request_count(&server).await, 3);
    Ok(())
}

#[tokio::test]
async fn test_gives_up_with_empty_query_after_max_attempts() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("{ this is not json }"))
        .expect(3)
        .mount(&server)
        .await;
    let parser = parser(&server, 3)?;

    let outcome = parser.parse("something odd", None).await;
    assert!(outcome.failed);
    assert_eq!(outcome.query, ParsedQuery::default());
    Ok(())
}
