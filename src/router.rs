//! Request validation and dispatch
//!
//! Validates an inbound tutoring-session request field by field, resolves
//! the model client and tutor persona, renders the prompt pair, and
//! invokes the selected client. Validation is a sequential guard chain,
//! terminal on the first failure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{Catalog, TutorId};
use crate::client::ModelClient;
use crate::error::{AppError, AppResult};
use crate::normalize::StringOrList;
use crate::prompt::{self, SessionState};

/// Dispatch mode: validated recommendations or raw diagnostic text
pub const MODE_INFERENCE: &str = "inference";
pub const MODE_TEST: &str = "test";

/// Inbound request payload
///
/// All fields deserialize as optional so the guard chain owns presence
/// checks and can name the missing field in its error message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendRequest {
    pub model_id: Option<String>,
    pub tutor_id: Option<String>,
    #[serde(rename = "KC")]
    pub kc: Option<StringOrList>,
    pub chat_history: Option<Vec<String>>,
    pub next_steps: Option<Vec<String>>,
    pub hints: Option<StringOrList>,
    pub correct_step_history: Option<StringOrList>,
    pub incorrect_step_history: Option<StringOrList>,
    pub curr_question: Option<String>,
}

/// Result of a processed request: three recommendations in inference
/// mode, the raw reply text in test mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Recommendations {
    Validated(Vec<String>),
    Raw(String),
}

/// Routing table plus tutor catalog, built once at startup
pub struct Router {
    catalog: Arc<Catalog>,
    clients: HashMap<String, Arc<ModelClient>>,
    /// Inbound model identifiers in configuration order, for error messages
    model_ids: Vec<String>,
}

impl Router {
    /// Build a router over a model routing table
    ///
    /// `clients` pairs each inbound model identifier with its client
    /// instance; insertion order is preserved for error messages.
    pub fn new(catalog: Arc<Catalog>, clients: Vec<(String, Arc<ModelClient>)>) -> Self {
        let model_ids = clients.iter().map(|(id, _)| id.clone()).collect();
        Self {
            catalog,
            clients: clients.into_iter().collect(),
            model_ids,
        }
    }

    /// Supported inbound model identifiers
    pub fn model_ids(&self) -> &[String] {
        &self.model_ids
    }

    /// Validate the request, render the prompt pair, invoke the model
    ///
    /// Returns the recommendation outcome paired with the concatenated
    /// system and user prompt as a diagnostic echo of what was sent.
    pub async fn process(
        &self,
        request: RecommendRequest,
        mode: &str,
    ) -> AppResult<(Recommendations, String)> {
        let model_id = request
            .model_id
            .ok_or_else(|| AppError::MissingField("model ID".to_string()))?;
        let client = self
            .clients
            .get(&model_id)
            .ok_or_else(|| AppError::UnsupportedModel {
                model_id: model_id.clone(),
                available: self.model_ids.clone(),
            })?;

        let tutor_id = request
            .tutor_id
            .ok_or_else(|| AppError::MissingField("tutor ID".to_string()))?;
        let tutor = TutorId::parse(&tutor_id).ok_or_else(|| AppError::UnsupportedTutor {
            tutor_id: tutor_id.clone(),
            available: TutorId::members().iter().map(|m| m.to_string()).collect(),
        })?;
        let persona = self
            .catalog
            .persona(tutor)
            .ok_or_else(|| AppError::Internal(format!("no persona configured for {tutor_id}")))?;

        let kcs = request
            .kc
            .ok_or_else(|| AppError::MissingField("knowledge component".to_string()))?
            .normalize();
        let mut knowledge_components = Vec::with_capacity(kcs.len());
        for kc in kcs {
            let definition = self
                .catalog
                .knowledge_component(&kc)
                .ok_or_else(|| AppError::UnknownKnowledgeComponent(kc.clone()))?;
            knowledge_components.push((kc, definition.to_string()));
        }

        let mut missing = Vec::new();
        for (name, present) in [
            ("chat_history", request.chat_history.is_some()),
            ("next_steps", request.next_steps.is_some()),
            ("hints", request.hints.is_some()),
            ("correct_step_history", request.correct_step_history.is_some()),
            (
                "incorrect_step_history",
                request.incorrect_step_history.is_some(),
            ),
            ("curr_question", request.curr_question.is_some()),
        ] {
            if !present {
                missing.push(name.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(AppError::MissingSessionFields(missing));
        }

        // Presence of the six fields was just checked
        let session = SessionState {
            current_problem: request.curr_question.unwrap_or_default(),
            chat_history: request.chat_history.unwrap_or_default(),
            correct_step_history: request
                .correct_step_history
                .unwrap_or(StringOrList::Many(Vec::new())),
            incorrect_step_history: request
                .incorrect_step_history
                .unwrap_or(StringOrList::Many(Vec::new())),
            hints: request.hints.unwrap_or(StringOrList::Many(Vec::new())),
            suggested_next_steps: request.next_steps.unwrap_or_default(),
            knowledge_components,
        };

        let pair = prompt::format_prompt(
            &persona.persona_statement,
            &persona.few_shot_examples,
            session,
        );
        let full_prompt = pair.full_text();

        let outcome = match mode {
            MODE_INFERENCE => client
                .send_prompt(&pair.system_prompt, &pair.user_prompt)
                .await
                .map(Recommendations::Validated)
                .map_err(|e| AppError::ModelInvocation(e.to_string()))?,
            MODE_TEST => client
                .send_prompt_unvalidated(&pair.system_prompt, &pair.user_prompt)
                .await
                .map(Recommendations::Raw)
                .map_err(|e| AppError::ModelInvocation(e.to_string()))?,
            other => {
                return Err(AppError::Internal(format!("Invalid mode '{other}'")));
            }
        };

        Ok((outcome, full_prompt))
    }
}
