/// LLM bridge: chat assistant and document analysis
///
/// Thin client over an OpenAI-compatible chat-completions API. Two call
/// sites use it:
///
/// - `POST /v1/chat` forwards the citizen's message plus derived profile
///   context and returns the assistant text.
/// - `POST /v1/documents` sends the uploaded file for analysis and stores
///   the returned metadata JSON on the document row.
///
/// Upstream failures surface as [`AssistantError`]; callers log and map
/// them to a 503. Nothing is retried.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::AssistantConfig;

/// Error type for LLM calls
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Transport-level failure (connection, timeout, TLS)
    #[error("Assistant request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("Assistant API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Response body didn't contain a completion
    #[error("Assistant returned an empty or malformed response")]
    EmptyResponse,
}

/// A single chat message in provider wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user", or "assistant"
    pub role: String,

    /// Message text
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// System prompt for the portal assistant
const ASSISTANT_SYSTEM_PROMPT: &str = "You are the assistant of a consular-services \
portal. You help citizens with consular procedures: passports, civil status \
documents, visas, and registrations. Answer concisely and only about consular \
matters. If you don't know, direct the user to contact their consulate.";

/// System prompt for document analysis
const ANALYSIS_SYSTEM_PROMPT: &str = "You analyze documents uploaded to a \
consular-services portal. Reply with a single JSON object containing: \
\"document_type\" (passport, id_card, birth_certificate, proof_of_address, \
photo, or other), \"legible\" (boolean), and \"summary\" (one sentence). \
Reply with JSON only, no prose.";

/// Client for the chat-completions provider
#[derive(Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl AssistantClient {
    /// Creates a client from assistant configuration
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Sends a chat turn and returns the assistant's reply text
    ///
    /// `context` is the derived profile context (name, nationality,
    /// consulate); it is appended to the system prompt so the model can
    /// personalize answers without seeing the whole profile row.
    pub async fn chat(
        &self,
        context: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, AssistantError> {
        let system = if context.is_empty() {
            ASSISTANT_SYSTEM_PROMPT.to_string()
        } else {
            format!("{}\n\nUser context: {}", ASSISTANT_SYSTEM_PROMPT, context)
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system,
        });
        messages.extend_from_slice(history);
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: user_message.to_string(),
        });

        self.complete(&messages).await
    }

    /// Analyzes an uploaded document and returns metadata JSON
    ///
    /// The file is sent base64-encoded inside the user message. If the
    /// model replies with something that isn't valid JSON, the raw text is
    /// wrapped as `{"raw": ...}` so the document row still records what
    /// came back.
    pub async fn analyze_document(
        &self,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<JsonValue, AssistantError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: ANALYSIS_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "File name: {}\nMIME type: {}\nContent (base64): {}",
                    name, mime_type, encoded
                ),
            },
        ];

        let reply = self.complete(&messages).await?;

        let analysis = serde_json::from_str::<JsonValue>(reply.trim())
            .unwrap_or_else(|_| serde_json::json!({ "raw": reply }));

        Ok(analysis)
    }

    /// Posts a completion request and extracts the first choice's text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AssistantError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&ChatCompletionRequest {
                model: &self.config.model,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(AssistantError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssistantConfig;

    fn client() -> AssistantClient {
        AssistantClient::new(AssistantConfig {
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com/v1/".to_string(),
            model: "gpt-4o-mini".to_string(),
        })
    }

    #[test]
    fn test_completion_response_parsing() {
        let json = r#"{
            "choices": [
                { "message": { "content": "Bring your passport and two photos." } }
            ]
        }"#;

        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Bring your passport and two photos.")
        );
    }

    #[test]
    fn test_completion_response_with_null_content() {
        let json = r#"{ "choices": [ { "message": { "content": null } } ] }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn test_client_construction() {
        // Compile-level check that the client clones cheaply for handlers
        let c = client();
        let _ = c.clone();
    }
}
