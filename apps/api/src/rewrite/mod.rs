//! Rewrite client — the single point of entry for all generative-service
//! calls.
//!
//! ARCHITECTURAL RULE: no other module may call the completion API directly.
//! The pipeline depends on the [`Rewrite`] trait so tests can substitute a
//! fake without any network access.
//!
//! Model: gpt-4o-mini (hardcoded — do not make configurable to prevent drift)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resume::RawResume;

pub mod prompts;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all rewrite calls.
pub const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.3;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned a non-JSON payload: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("model returned empty content")]
    Empty,

    #[error("upstream rate limit reached")]
    Throttled,

    #[error("rewrite call timed out")]
    Timeout,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    error: UpstreamErrorBody,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait + client
// ────────────────────────────────────────────────────────────────────────────

/// The rewrite seam: exactly one logical request per invocation — the fixed
/// schema instruction plus the extracted text as the only variable input.
#[async_trait]
pub trait Rewrite: Send + Sync {
    async fn rewrite(&self, resume_text: &str) -> Result<RawResume, GenerationError>;
}

/// Production rewrite client over the chat-completions API.
#[derive(Clone)]
pub struct RewriteClient {
    client: Client,
    api_key: String,
}

impl RewriteClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes the completion call, retrying transport failures and 5xx
    /// responses with exponential backoff.
    ///
    /// 429 is surfaced immediately as `Throttled` (never retried) so the
    /// caller can report a distinct status, and a timed-out final attempt
    /// surfaces as `Timeout`.
    async fn call(&self, resume_text: &str) -> Result<String, GenerationError> {
        let system = prompts::rewrite_system();
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: resume_text,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut last_error: Option<GenerationError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Rewrite attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(OPENAI_API_URL)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    last_error = Some(GenerationError::Timeout);
                    continue;
                }
                Err(e) => {
                    last_error = Some(GenerationError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 {
                return Err(GenerationError::Throttled);
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Rewrite API returned {}: {}", status, body);
                last_error = Some(GenerationError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<UpstreamError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(GenerationError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;
            let content = chat
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|c| !c.trim().is_empty())
                .ok_or(GenerationError::Empty)?;

            debug!("Rewrite call succeeded ({} chars)", content.len());
            return Ok(content);
        }

        Err(last_error.unwrap_or(GenerationError::Throttled))
    }
}

#[async_trait]
impl Rewrite for RewriteClient {
    async fn rewrite(&self, resume_text: &str) -> Result<RawResume, GenerationError> {
        let content = self.call(resume_text).await?;
        parse_payload(&content)
    }
}

/// Parses the model output into the raw resume shape, stripping code fences
/// and stray prose first.
pub fn parse_payload(content: &str) -> Result<RawResume, GenerationError> {
    let text = strip_json_fences(content);
    match serde_json::from_str(text) {
        Ok(raw) => Ok(raw),
        Err(first_err) => {
            // Stray prose around the object: retry on the outermost braces.
            if let Some(inner) = outermost_object(text) {
                if let Ok(raw) = serde_json::from_str(inner) {
                    return Ok(raw);
                }
            }
            Err(GenerationError::Malformed(first_err))
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the slice from the first `{` through the last `}`, if any.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"name\": \"Ada\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"name\": \"Ada\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"name\": \"Ada\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"name\": \"Ada\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"name\": \"Ada\"}";
        assert_eq!(strip_json_fences(input), "{\"name\": \"Ada\"}");
    }

    #[test]
    fn test_parse_payload_fenced_object() {
        let raw = parse_payload("```json\n{\"name\": \"Ada Lovelace\"}\n```").unwrap();
        assert_eq!(raw.name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_parse_payload_with_stray_prose() {
        let raw = parse_payload("Here is the improved resume:\n{\"name\": \"Ada\"}\nLet me know!")
            .unwrap();
        assert_eq!(raw.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_parse_payload_tolerates_null_sections() {
        let raw = parse_payload(r#"{"name": "Ada", "education": null, "skills": null}"#).unwrap();
        assert_eq!(raw.name.as_deref(), Some("Ada"));
        assert!(raw.skills.is_empty());
        assert!(raw.education.into_vec().is_empty());
    }

    #[test]
    fn test_parse_payload_truncated_json_is_malformed() {
        let result = parse_payload("{\"name\": \"Ada\", \"skills\": [\"Ru");
        assert!(matches!(result, Err(GenerationError::Malformed(_))));
    }

    #[test]
    fn test_parse_payload_non_json_is_malformed() {
        let result = parse_payload("I am sorry, I cannot help with that.");
        assert!(matches!(result, Err(GenerationError::Malformed(_))));
    }
}
