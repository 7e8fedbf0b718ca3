//! Plan generation: prompt in, provisional plan out.
//!
//! [`TextGenerator`] is the seam to the external model; [`GeminiClient`] is
//! the production implementation. [`PlanGenerator`] layers the plan contract
//! on top: it builds the prompt, strips Markdown fences from the reply,
//! parses the JSON, and checks the plan's structure.
//!
//! Failures are split three ways so callers can tell them apart:
//! the call itself failed ([`GenerationError`]), the reply was not a plan
//! ([`PlanError::Parse`]), or the plan parsed but is unusable
//! ([`PlanError::Invalid`]). Nothing is retried.

pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error};

use fitplan_db::models::Exercise;

use crate::plan::{PlanValidationError, ProvisionalPlan, validate_plan};
use crate::prompt::{DAYS_PER_WEEK, prompt_for_request};
use crate::request::PlanRequest;

pub use gemini::{GeminiClient, GeminiConfig};

/// The external model call failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to AI service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("AI service response could not be decoded: {0}")]
    Decode(String),

    #[error("AI service returned no text")]
    EmptyResponse,
}

/// Producing a provisional plan failed.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("AI generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid response format from AI: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("AI plan failed validation: {0}")]
    Invalid(#[from] PlanValidationError),
}

/// Prompt-in, text-out access to a generative model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short name for logs (e.g. the model id).
    fn name(&self) -> &str;

    /// Send `prompt` and return the model's raw text reply.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn TextGenerator) {}
};

/// Turns plan requests into provisional plans using a [`TextGenerator`].
#[derive(Clone)]
pub struct PlanGenerator {
    model: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for PlanGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanGenerator")
            .field("model", &self.model.name())
            .finish()
    }
}

impl PlanGenerator {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    /// Ask the model for a plan built only from `exercises`.
    pub async fn generate_plan(
        &self,
        request: &PlanRequest,
        exercises: &[Exercise],
    ) -> Result<ProvisionalPlan, PlanError> {
        let prompt = prompt_for_request(request, exercises);
        debug!(
            model = self.model.name(),
            prompt_len = prompt.len(),
            exercises = exercises.len(),
            "requesting workout plan"
        );

        let text = self.model.generate(&prompt).await.map_err(|e| {
            error!(model = self.model.name(), error = %e, "AI generation failed");
            e
        })?;

        let plan = parse_plan_response(&text)?;
        validate_plan(&plan, DAYS_PER_WEEK)?;
        Ok(plan)
    }
}

/// Remove a Markdown code fence wrapping the reply, if there is one.
///
/// Handles a leading ```` ``` ```` or ```` ```json ```` line and a trailing
/// ```` ``` ````, each optional, and trims surrounding whitespace.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse the model's reply into a plan, after stripping any code fence.
pub fn parse_plan_response(text: &str) -> Result<ProvisionalPlan, PlanError> {
    let cleaned = strip_code_fence(text);
    serde_json::from_str(cleaned).map_err(|e| {
        error!(error = %e, response_len = text.len(), "failed to parse AI response");
        PlanError::Parse(e)
    })
}
