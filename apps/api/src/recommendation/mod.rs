// Recommendation pipeline: prompt → Gemini structured output → normalized crop cards.
// All LLM calls go through the llm_client port, never direct HTTP calls.

pub mod adapter;
pub mod handlers;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod schema;

use thiserror::Error;

/// Failure of a single recommendation request.
///
/// Both variants are shown to the user as the same generic notice; the split exists
/// for logs and tests.
#[derive(Debug, Error)]
pub enum RecommendationError {
    /// Transport, auth, quota or upstream status failure.
    #[error("Recommendation request failed: {0}")]
    RequestFailed(String),

    /// The model answered, but not with a document of the expected shape.
    #[error("Malformed recommendation response: {0}")]
    MalformedResponse(String),
}

impl RecommendationError {
    pub fn kind(&self) -> &'static str {
        match self {
            RecommendationError::RequestFailed(_) => "request_failed",
            RecommendationError::MalformedResponse(_) => "malformed_response",
        }
    }
}
