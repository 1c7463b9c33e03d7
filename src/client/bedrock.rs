//! Managed-inference backend (Bedrock-style invoke API)
//!
//! Sends a single instruction-formatted text block to the runtime's
//! per-model invoke endpoint and reads the reply from the `generation`
//! field. Request credentials are the runtime's concern (ambient IAM or a
//! fronting gateway); this backend only shapes the request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{BackendError, ModelBackend};
use crate::config::GenerationConfig;

/// Role-delimited instruction template for the Llama 3 model family
const LLAMA3_PROMPT_FORMAT: &str = "
<|begin_of_text|><|start_header_id|>system<|end_header_id|>

{system-prompt}<|eot_id|><|start_header_id|>user<|end_header_id|>

{user-prompt}<|eot_id|><|start_header_id|>assistant<|end_header_id|>
";

#[derive(Debug, Serialize)]
struct InvokeRequest {
    prompt: String,
    max_gen_len: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct InvokeReply {
    generation: Option<String>,
}

/// Client for a Bedrock-style managed-inference runtime
pub struct BedrockBackend {
    model_key: String,
    base_url: String,
    generation: GenerationConfig,
    http: reqwest::Client,
}

impl BedrockBackend {
    pub fn new(
        model_key: String,
        base_url: String,
        generation: GenerationConfig,
        http: reqwest::Client,
    ) -> Self {
        Self {
            model_key,
            base_url,
            generation,
            http,
        }
    }

    /// Collapse the prompt pair into the single text block the invoke API expects
    ///
    /// Llama 3 models get the role-delimited instruction template; anything
    /// else gets the two prompts joined by a newline.
    fn shape_prompt(&self, system_prompt: &str, user_prompt: &str) -> String {
        if self.model_key.contains("llama3") {
            LLAMA3_PROMPT_FORMAT
                .replace("{system-prompt}", system_prompt)
                .replace("{user-prompt}", user_prompt)
        } else {
            format!("{system_prompt}\n{user_prompt}")
        }
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.base_url, self.model_key)
    }
}

#[async_trait]
impl ModelBackend for BedrockBackend {
    fn model_key(&self) -> &str {
        &self.model_key
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, BackendError> {
        let url = self.invoke_url();
        let body = InvokeRequest {
            prompt: self.shape_prompt(system_prompt, user_prompt),
            max_gen_len: self.generation.max_tokens,
            temperature: self.generation.temperature,
        };

        let response = self
            .http
            .post(&url)
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
                "Managed-inference invoke failed"
            );
            return Err(BackendError::Service {
                endpoint: url,
                status: status.as_u16(),
                body,
            });
        }

        let reply: InvokeReply =
            response.json().await.map_err(|e| BackendError::Transport {
                endpoint: url,
                reason: e.to_string(),
            })?;

        reply
            .generation
            .ok_or(BackendError::MalformedReply("generation"))
    }
}
