//! Chat-completion backend (OpenAI API)
//!
//! Sends the prompt pair as two role-tagged messages to the chat
//! completions endpoint and reads the first choice's message content.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::client::{BackendError, ModelBackend};
use crate::config::GenerationConfig;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
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

/// Resolve the API key: the configured env var if any, then
/// `OPENAI_API_KEY`, then `OPEN_AI_API_KEY`, then a key file
pub fn resolve_api_key(
    key_env: Option<&str>,
    key_file: Option<&Path>,
) -> Result<String, BackendError> {
    let vars = key_env
        .into_iter()
        .chain(["OPENAI_API_KEY", "OPEN_AI_API_KEY"]);
    for var in vars {
        if let Ok(key) = std::env::var(var)
            && !key.is_empty()
        {
            return Ok(key);
        }
    }
    if let Some(path) = key_file {
        return match std::fs::read_to_string(path) {
            Ok(key) => Ok(key.trim().to_string()),
            Err(e) => Err(BackendError::MissingCredentials(format!(
                "failed to read key file {}: {e}",
                path.display()
            ))),
        };
    }
    Err(BackendError::MissingCredentials(
        "API key env vars unset and no key file configured".to_string(),
    ))
}

/// Client for an OpenAI-compatible chat completions endpoint
pub struct OpenAiBackend {
    model_key: String,
    base_url: String,
    api_key: String,
    generation: GenerationConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(
        model_key: String,
        base_url: String,
        api_key: String,
        generation: GenerationConfig,
        http: reqwest::Client,
    ) -> Self {
        Self {
            model_key,
            base_url,
            api_key,
            generation,
            http,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    fn model_key(&self) -> &str {
        &self.model_key
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, BackendError> {
        let url = self.completions_url();
        let body = ChatCompletionRequest {
            model: self.model_key.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                model_key = %self.model_key,
                status = %status,
                "Chat completion request failed"
            );
            return Err(BackendError::Service {
                endpoint: url,
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatCompletionReply =
            response.json().await.map_err(|e| BackendError::Transport {
                endpoint: url,
                reason: e.to_string(),
            })?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::MalformedReply("choices[0].message.content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_completions_url_appends_path() {
        let backend = OpenAiBackend::new(
            "gpt-4o".to_string(),
            "https://api.openai.com/v1".to_string(),
            "sk-test".to_string(),
            GenerationConfig::default(),
            reqwest::Client::new(),
        );
        assert_eq!(
            backend.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_key_file() {
        // Only exercised when the env vars are unset, as in CI
        if std::env::var("OPENAI_API_KEY").is_ok() || std::env::var("OPEN_AI_API_KEY").is_ok() {
            return;
        }
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "sk-from-file").expect("write key");

        let key = resolve_api_key(None, Some(file.path())).expect("resolve");
        assert_eq!(key, "sk-from-file");
    }

    #[test]
    fn test_resolve_api_key_prefers_configured_env_var() {
        // A var name nothing else in the suite touches
        unsafe { std::env::set_var("RECROUTE_CUSTOM_KEY_VAR", "sk-from-custom-var") };

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "sk-from-file").expect("write key");

        let key =
            resolve_api_key(Some("RECROUTE_CUSTOM_KEY_VAR"), Some(file.path())).expect("resolve");
        assert_eq!(key, "sk-from-custom-var");
    }

    #[test]
    fn test_resolve_api_key_unset_configured_var_falls_through() {
        if std::env::var("OPENAI_API_KEY").is_ok() || std::env::var("OPEN_AI_API_KEY").is_ok() {
            return;
        }
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "sk-from-file").expect("write key");

        let key = resolve_api_key(Some("RECROUTE_UNSET_KEY_VAR"), Some(file.path()))
            .expect("resolve");
        assert_eq!(key, "sk-from-file");
    }

    #[test]
    fn test_resolve_api_key_errors_without_any_source() {
        if std::env::var("OPENAI_API_KEY").is_ok() || std::env::var("OPEN_AI_API_KEY").is_ok() {
            return;
        }
        let result = resolve_api_key(None, None);
        assert!(matches!(result, Err(BackendError::MissingCredentials(_))));
    }

    #[test]
    fn test_chat_request_serializes_role_tagged_messages() {
        let body = ChatCompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: "user".to_string(),
                },
            ],
            max_tokens: 512,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 512);
    }

    #[test]
    fn test_reply_parses_first_choice_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"a # b # c"}}]}"#;
        let reply: ChatCompletionReply = serde_json::from_str(raw).expect("parse");
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("a # b # c"));
    }
}
