//! SerpAPI (Google) search client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{SearchError, SearchService};

/// SerpAPI search endpoint.
const SERPAPI_SEARCH_URL: &str = "https://serpapi.com/search";

/// Returned when a response carries nothing usable.
pub const NO_RESULT: &str = "No good search result found";

/// Client for SerpAPI's Google engine.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }
}

impl SearchService for SerpApiClient {
    fn run(&self, query: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(SERPAPI_SEARCH_URL)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| {
                warn!(error = %e, "SerpAPI request failed");
                SearchError::Network(e.to_string())
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        if !status.is_success() && body.get("error").is_none() {
            return Err(SearchError::Api(format!("Search request failed: {}", status)));
        }

        let digest = digest_response(&body)?;
        debug!(query, chars = digest.len(), "Search complete");
        Ok(digest)
    }
}

/// Reduce a SerpAPI response to the single most useful snippet.
///
/// Checks, in order: answer box answer, answer box snippet, the first
/// highlighted word of the answer box, the sports spotlight, the knowledge
/// graph description and the first organic result snippet.
pub fn digest_response(body: &Value) -> Result<String, SearchError> {
    if let Some(error) = body.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(SearchError::Api(message));
    }

    let answer_box = &body["answer_box"];
    let candidates = [
        &answer_box["answer"],
        &answer_box["snippet"],
        &answer_box["snippet_highlighted_words"][0],
        &body["sports_results"]["game_spotlight"],
        &body["knowledge_graph"]["description"],
    ];

    for candidate in candidates {
        if let Some(text) = non_empty_text(candidate) {
            return Ok(text);
        }
    }

    let organic = body["organic_results"]
        .get(0)
        .and_then(|first| non_empty_text(&first["snippet"]));

    Ok(organic.unwrap_or_else(|| NO_RESULT.to_string()))
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(_) | Value::Array(_) => Some(value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_field_is_an_error() {
        let body = json!({ "error": "Invalid API key." });
        match digest_response(&body) {
            Err(SearchError::Api(msg)) => assert_eq!(msg, "Invalid API key."),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_answer_box_wins() {
        let body = json!({
            "answer_box": { "answer": "Espressif", "snippet": "ignored" },
            "organic_results": [{ "snippet": "ignored too" }]
        });
        assert_eq!(digest_response(&body).unwrap(), "Espressif");

        let body = json!({
            "answer_box": { "snippet_highlighted_words": ["Tuya", "Shelly"] }
        });
        assert_eq!(digest_response(&body).unwrap(), "Tuya");
    }

    #[test]
    fn test_knowledge_graph_before_organic() {
        let body = json!({
            "knowledge_graph": { "description": "Smart home vendor" },
            "organic_results": [{ "snippet": "organic" }]
        });
        assert_eq!(digest_response(&body).unwrap(), "Smart home vendor");
    }

    #[test]
    fn test_first_organic_snippet() {
        let body = json!({
            "organic_results": [
                { "snippet": "Top 10 smart plug makers: Acme, Globex" },
                { "snippet": "later" }
            ]
        });
        assert_eq!(
            digest_response(&body).unwrap(),
            "Top 10 smart plug makers: Acme, Globex"
        );
    }

    #[test]
    fn test_only_top_organic_result_is_used() {
        let body = json!({
            "organic_results": [
                { "title": "no snippet" },
                { "snippet": "second result" }
            ]
        });
        assert_eq!(digest_response(&body).unwrap(), NO_RESULT);
    }

    #[test]
    fn test_nothing_usable() {
        assert_eq!(digest_response(&json!({})).unwrap(), NO_RESULT);
    }
}
