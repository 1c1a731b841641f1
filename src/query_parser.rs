//! # Natural-Language Query Parser
//!
//! Turns a free-text search ("Barcelona last match") into a [`ParsedQuery`]
//! by asking an OpenAI-compatible chat-completion endpoint to extract the
//! entities as a bare JSON object.
//!
//! Models routinely wrap the object in prose or code fences, so only the
//! text between the first `{` and the last `}` is decoded. Transport and
//! decoding failures are retried; once the attempts are used up the parser
//! returns an empty query flagged as failed instead of an error.

use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, RetryConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    Today,
    Tomorrow,
    Yesterday,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureType {
    Last,
    Next,
    Today,
    Live,
}

/// Entities extracted from a free-text query. Any combination of fields may
/// be empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParsedQuery {
    #[serde(deserialize_with = "string_list")]
    pub teams: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub leagues: Vec<String>,
    #[serde(deserialize_with = "non_blank")]
    pub match_query: Option<String>,
    #[serde(deserialize_with = "lenient_enum")]
    pub date_filter: Option<DateFilter>,
    #[serde(deserialize_with = "lenient_enum")]
    pub fixture_type: Option<FixtureType>,
    #[serde(deserialize_with = "non_blank")]
    pub sport: Option<String>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
            && self.leagues.is_empty()
            && self.match_query.is_none()
            && self.date_filter.is_none()
            && self.fixture_type.is_none()
            && self.sport.is_none()
    }
}

/// Result of [`QueryParser::parse`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub query: ParsedQuery,
    /// Every attempt failed; `query` is the empty fallback
    pub failed: bool,
}

#[derive(Debug, Error)]
pub enum QueryParseError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("completion has no message content")]
    EmptyCompletion,
    #[error("no JSON object in model output")]
    NoJsonObject,
    #[error("model output is not a valid query: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Build the extraction instruction for `text`.
pub fn build_prompt(text: &str, current_sport: Option<&str>) -> String {
    let sport = current_sport.unwrap_or("unknown");
    format!(
        r#"You extract search parameters for a sports results bot.
The user's current sport is: {sport}.
User message: "{text}"

Reply with ONLY a JSON object, no prose and no code fences, exactly of this shape:
{{"teams": [], "leagues": [], "match_query": null, "date_filter": null, "fixture_type": null, "sport": null}}

Rules:
- "teams": team or player names mentioned, in their usual English spelling (e.g. "Барселона" -> "Barcelona").
- "leagues": competition names mentioned (e.g. "Premier League", "NBA").
- "match_query": a free-text description of a specific match if one is mentioned, otherwise null.
- "date_filter": "today", "tomorrow", "yesterday" or "live" when the message names that day or live play, otherwise null.
- "fixture_type": "last" for last/previous/recent/прошлый/последний; "next" for next/upcoming/следующий/ближайший; "today" for today/сегодня; "live" for live/now/сейчас/онлайн; otherwise null.
- "sport": one of "football", "basketball", "ice-hockey", "tennis" only if the message names a sport, otherwise null.
- Never invent entities that are not in the message."#
    )
}

/// Substring from the first `{` to the last `}`, if any.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Decode a model reply into a query.
pub fn parse_model_output(raw: &str) -> Result<ParsedQuery, QueryParseError> {
    let json = extract_json_object(raw).ok_or(QueryParseError::NoJsonObject)?;
    Ok(serde_json::from_str(json)?)
}

/// Client for the chat-completion endpoint
pub struct QueryParser {
    http: Client,
    config: LlmConfig,
}

impl QueryParser {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        info!(model = %config.model, url = %config.api_url, "Query parser initialized");
        Ok(Self { http, config })
    }

    /// Extract entities from `text`, never failing.
    ///
    /// After `max_attempts` failed attempts the empty query is returned with
    /// `failed` set so the caller can tell the user.
    pub async fn parse(&self, text: &str, current_sport: Option<&str>) -> ParseOutcome {
        let prompt = build_prompt(text, current_sport);
        let attempts = self.config.retry.max_attempts.max(1);

        for attempt in 1..=attempts {
            match self.complete(&prompt).await.and_then(|raw| {
                debug!(attempt, raw = %raw, "Model output");
                parse_model_output(&raw)
            }) {
                Ok(query) => {
                    info!(attempt, ?query, "Query parsed");
                    return ParseOutcome { query, failed: false };
                }
                Err(e) => {
                    warn!(attempt, max_attempts = attempts, error = %e, "Query parsing attempt failed");
                    if attempt < attempts {
                        tokio::time::sleep(retry_delay(&self.config.retry, attempt)).await;
                    }
                }
            }
        }

        warn!("Query parsing gave up, using empty query");
        ParseOutcome {
            query: ParsedQuery::default(),
            failed: true,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, QueryParseError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryParseError::Status(status));
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(QueryParseError::EmptyCompletion)
    }
}

/// Exponential backoff with up to 25% random jitter, capped at the maximum.
pub fn retry_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    let exp = retry
        .base_retry_delay_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(16));
    let capped = exp.min(retry.max_retry_delay_ms);
    let jitter = rand::thread_rng().gen_range(0..=capped / 4);
    Duration::from_millis(capped.saturating_sub(jitter))
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    })
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .map(str::to_string))
}

/// Unknown or misspelled enum values decode as `None`.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => {
            serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase())).ok()
        }
        _ => None,
    }))
}
