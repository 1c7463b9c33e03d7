//! Model client capability: backends, validation, retry, and fallback
//!
//! A [`ModelBackend`] performs one raw network round trip to a hosted
//! model. [`ModelClient`] wraps a backend with prompt-pair memoization and
//! the validate/retry/fallback policy that guarantees inference callers
//! always receive exactly three recommendations.

pub mod bedrock;
pub mod cache;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use self::cache::PromptCache;

/// Delimiter separating recommendations in a model reply
pub const DELIMITER: char = '#';

/// Fallback triple returned when the model reply fails validation twice
pub const DEFAULT_RECOMMENDATIONS: [&str; 3] = [
    "[Ask your child to self-explain:] Explain to me what you have just done.",
    "[Ask your child to self-explain:] Explain to me what you did here.",
    "[Guide your child through the problem:] What is your next step and why?",
];

/// Total attempts before substituting the defaults (one retry)
const MAX_ATTEMPTS: usize = 2;

/// Cached prompt pairs per client instance
const CACHE_CAPACITY: usize = 1024;

/// Errors from the raw network call to a model backend
///
/// These propagate uncaught through the validation layer; a transport or
/// service failure is never treated as a malformed reply.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Backend at {endpoint} returned status {status}: {body}")]
    Service {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Backend reply missing expected field '{0}'")]
    MalformedReply(&'static str),

    #[error("No API key available: {0}")]
    MissingCredentials(String),
}

/// One raw round trip to a hosted model
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Backend-native model key (e.g. "meta.llama3-8b-instruct-v1:0")
    fn model_key(&self) -> &str;

    /// Send the prompt pair and return the reply text, unparsed
    async fn invoke(&self, system_prompt: &str, user_prompt: &str)
    -> Result<String, BackendError>;
}

/// Split a raw reply into exactly three trimmed recommendations
///
/// Returns `None` unless splitting the trimmed reply on [`DELIMITER`]
/// yields exactly three segments.
pub fn split_recommendations(reply: &str) -> Option<Vec<String>> {
    let segments: Vec<String> = reply
        .trim()
        .split(DELIMITER)
        .map(|segment| segment.trim().to_string())
        .collect();
    if segments.len() == 3 {
        Some(segments)
    } else {
        None
    }
}

fn default_recommendations() -> Vec<String> {
    DEFAULT_RECOMMENDATIONS
        .iter()
        .map(|rec| rec.to_string())
        .collect()
}

/// A model backend plus memoization and the recommendation contract
///
/// Stateless per call apart from the bounded prompt-pair caches. One
/// instance is constructed per routing-table entry at startup and lives
/// for the process.
pub struct ModelClient {
    backend: Arc<dyn ModelBackend>,
    validated: PromptCache<Vec<String>>,
    raw: PromptCache<String>,
}

impl ModelClient {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            validated: PromptCache::new(CACHE_CAPACITY),
            raw: PromptCache::new(CACHE_CAPACITY),
        }
    }

    /// Backend-native model key
    pub fn model_key(&self) -> &str {
        self.backend.model_key()
    }

    /// Send the prompt pair and return exactly three recommendations
    ///
    /// Memoized on the exact prompt pair. On a malformed reply (segment
    /// count != 3) the network call is reissued once with the same
    /// prompts; if the second reply is also malformed, the fixed default
    /// triple is substituted and the malformed reply is logged. Backend
    /// errors propagate to the caller and are never cached.
    pub async fn send_prompt(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Vec<String>, BackendError> {
        let key = (system_prompt.to_string(), user_prompt.to_string());
        self.validated
            .get_or_try_populate(key, || async {
                for attempt in 1..=MAX_ATTEMPTS {
                    let reply = self.backend.invoke(system_prompt, user_prompt).await?;
                    match split_recommendations(&reply) {
                        Some(recommendations) => return Ok(recommendations),
                        None => {
                            tracing::warn!(
                                model_key = %self.backend.model_key(),
                                attempt,
                                max_attempts = MAX_ATTEMPTS,
                                reply = %reply,
                                "Model reply failed recommendation validation"
                            );
                        }
                    }
                }
                tracing::error!(
                    model_key = %self.backend.model_key(),
                    "All attempts returned malformed replies, substituting default recommendations"
                );
                Ok(default_recommendations())
            })
            .await
    }

    /// Send the prompt pair and return the raw reply text
    ///
    /// Diagnostic path: memoized like [`send_prompt`](Self::send_prompt)
    /// but with no splitting, validation, or retry.
    pub async fn send_prompt_unvalidated(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, BackendError> {
        let key = (system_prompt.to_string(), user_prompt.to_string());
        self.raw
            .get_or_try_populate(key, || self.backend.invoke(system_prompt, user_prompt))
            .await
    }
}
