//! Recommendation Adapter: one reading in, one external call, one normalized result out.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::llm_client::{CompletionRequest, LlmError, StructuredCompletion};
use crate::models::recommendation::RecommendationResult;
use crate::models::soil::SoilReading;
use crate::recommendation::normalizer::normalize_response;
use crate::recommendation::prompts::build_prompt;
use crate::recommendation::schema::response_schema;
use crate::recommendation::RecommendationError;

#[derive(Clone)]
pub struct RecommendationAdapter {
    llm: Arc<dyn StructuredCompletion>,
    model: String,
    schema: Value,
}

impl RecommendationAdapter {
    pub fn new(llm: Arc<dyn StructuredCompletion>, model: String) -> Self {
        Self {
            llm,
            model,
            schema: response_schema(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Performs exactly one completion call. No retry, no caching.
    pub async fn request_recommendations(
        &self,
        reading: &SoilReading,
    ) -> Result<RecommendationResult, RecommendationError> {
        let prompt = build_prompt(reading);
        let request = CompletionRequest {
            model: &self.model,
            prompt: &prompt,
            response_schema: &self.schema,
        };

        let raw = self
            .llm
            .complete(&request)
            .await
            .map_err(classify_llm_error)?;
        debug!("Received {} bytes of recommendation payload", raw.len());

        normalize_response(&raw)
    }
}

/// An answer with no text is a shape problem; everything else is a failed request.
fn classify_llm_error(error: LlmError) -> RecommendationError {
    match error {
        LlmError::EmptyContent => RecommendationError::MalformedResponse(error.to_string()),
        other => RecommendationError::RequestFailed(other.to_string()),
    }
}
