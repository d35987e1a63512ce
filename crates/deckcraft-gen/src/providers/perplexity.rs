//! Perplexity content provider
//!
//! Sends chat-completion requests to the Perplexity API. Answers are
//! research-backed and usually carry citation markers, which callers strip.

use super::classify_error;
use crate::config::DeckcraftConfig;
use crate::service::{ContentRequest, ContentResponse, ContentService, ServiceStatus};
use deckcraft_core::{DeckError, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

const DEFAULT_PERPLEXITY_URL: &str = "https://api.perplexity.ai/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.1-sonar-small-128k-online";
const TEMPERATURE: f64 = 0.3;
const MAX_INLINE_CITATIONS: usize = 5;

static INLINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid regex"));

/// Content service backed by the Perplexity chat completions API
pub struct PerplexityService {
    api_key: Option<String>,
    api_url: String,
    model: String,
    agent: ureq::Agent,
}

impl PerplexityService {
    /// Create from config. A missing API key is reported by `status()` and
    /// by every call, not here.
    pub fn from_config(config: &DeckcraftConfig, agent: ureq::Agent) -> Self {
        Self {
            api_key: config.api_key("perplexity").map(str::to_string),
            api_url: config
                .api_url("perplexity")
                .unwrap_or(DEFAULT_PERPLEXITY_URL)
                .to_string(),
            model: config
                .model("perplexity")
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            agent,
        }
    }

    fn payload(&self, request: &ContentRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if !request.system_prompt.is_empty() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": request.system_prompt,
            }));
        }
        messages.push(serde_json::json!({
            "role": "user",
            "content": request.prompt,
        }));

        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": TEMPERATURE,
            "max_tokens": request.max_tokens,
        })
    }
}

impl ContentService for PerplexityService {
    fn name(&self) -> &str {
        "perplexity"
    }

    fn status(&self) -> ServiceStatus {
        match self.api_key {
            Some(_) => ServiceStatus::Available,
            None => ServiceStatus::NoApiKey,
        }
    }

    fn complete(&self, request: &ContentRequest, timeout: Duration) -> Result<ContentResponse> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DeckError::Config(
                "Perplexity API key not configured. Set DECKCRAFT_PERPLEXITY_API_KEY or add to .deckcraft/config.toml"
                    .to_string(),
            )
        })?;
        if timeout.is_zero() {
            return Err(DeckError::TransientUpstream(
                "no time left for perplexity request".to_string(),
            ));
        }

        let mut response = self
            .agent
            .post(&self.api_url)
            .config()
            .timeout_global(Some(timeout))
            .build()
            .header("Authorization", &format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .send_json(&self.payload(request))
            .map_err(|e| classify_error("perplexity", e))?;

        let body: serde_json::Value = response.body_mut().read_json().map_err(|e| {
            DeckError::InvalidResponse(format!("Failed to parse Perplexity response: {}", e))
        })?;
        parse_completion(&body)
    }
}

/// Extract text and citations from a chat-completions response body
pub fn parse_completion(body: &serde_json::Value) -> Result<ContentResponse> {
    let message = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            DeckError::InvalidResponse("Perplexity response has no choices".to_string())
        })?;

    let text = message
        .get("content")
        .and_then(|c| c.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            DeckError::InvalidResponse("Perplexity response has empty content".to_string())
        })?
        .to_string();

    let listed = body
        .get("citations")
        .or_else(|| message.get("citations"))
        .and_then(|c| c.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|c| c.as_str().map(str::to_string))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let raw_citations = if listed.is_empty() {
        inline_citations(&text)
    } else {
        listed
    };

    Ok(ContentResponse {
        text,
        raw_citations,
    })
}

/// Citation labels for `[n]` markers when the API sent no citation list
fn inline_citations(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for cap in INLINE_MARKER.captures_iter(text) {
        let label = format!("Source {}", &cap[1]);
        if !seen.contains(&label) {
            seen.push(label);
        }
        if seen.len() == MAX_INLINE_CITATIONS {
            break;
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_with_citation_list() {
        let body = serde_json::json!({
            "model": "sonar",
            "choices": [{
                "message": {"role": "assistant", "content": "  Market is large [1].  "}
            }],
            "citations": ["https://example.com/report"]
        });
        let response = parse_completion(&body).unwrap();
        assert_eq!(response.text, "Market is large [1].");
        assert_eq!(response.raw_citations, vec!["https://example.com/report"]);
    }

    #[test]
    fn test_parse_completion_inline_citations() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "A [1] B [2] C [1]"}}]
        });
        let response = parse_completion(&body).unwrap();
        assert_eq!(response.raw_citations, vec!["Source 1", "Source 2"]);
    }

    #[test]
    fn test_parse_completion_rejects_empty() {
        let body = serde_json::json!({"choices": [{"message": {"content": "   "}}]});
        assert!(matches!(
            parse_completion(&body),
            Err(DeckError::InvalidResponse(_))
        ));

        let body = serde_json::json!({"error": "rate limited"});
        assert!(matches!(
            parse_completion(&body),
            Err(DeckError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_missing_key_fails_without_network() {
        let service =
            PerplexityService::from_config(&DeckcraftConfig::default(), crate::providers::build_agent());
        assert_eq!(service.status(), ServiceStatus::NoApiKey);
        let request = ContentRequest {
            prompt: "p".to_string(),
            system_prompt: String::new(),
            max_tokens: 10,
        };
        assert!(matches!(
            service.complete(&request, Duration::from_secs(1)),
            Err(DeckError::Config(_))
        ));
    }

    #[test]
    fn test_payload_shape() {
        let service =
            PerplexityService::from_config(&DeckcraftConfig::default(), crate::providers::build_agent());
        let payload = service.payload(&ContentRequest {
            prompt: "Describe the market".to_string(),
            system_prompt: "You are an analyst".to_string(),
            max_tokens: 800,
        });
        assert_eq!(payload["max_tokens"], 800);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "Describe the market");
        assert_eq!(payload["model"], DEFAULT_MODEL);
    }
}
