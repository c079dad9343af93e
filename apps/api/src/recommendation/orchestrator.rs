//! Submission Orchestrator owns the form session and its single current-result slot.
//!
//! Every submission is tagged with a strictly increasing token. A completion may write
//! the slot only if its token is still the latest one issued; anything older is a
//! stale completion and is dropped. `reset` issues a token of its own, so requests
//! in flight when the user resets can never bring a cleared result back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::recommendation::RecommendationResult;
use crate::models::soil::SoilReading;
use crate::recommendation::adapter::RecommendationAdapter;
use crate::recommendation::RecommendationError;

/// Outcome of a submission that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The result became the session's current result.
    Applied {
        token: u64,
        result: RecommendationResult,
    },
    /// A later submission or a reset was issued before this one completed.
    Superseded { token: u64 },
}

impl Submission {
    pub fn token(&self) -> u64 {
        match self {
            Submission::Applied { token, .. } | Submission::Superseded { token } => *token,
        }
    }
}

/// Read-only view of the session for the rendering layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub reading: SoilReading,
    pub result: Option<RecommendationResult>,
    /// True while the latest submission has not completed. The UI disables submit on it.
    pub pending: bool,
    pub latest_token: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Session {
    reading: SoilReading,
    result: Option<RecommendationResult>,
    latest_token: u64,
    settled_token: u64,
    updated_at: Option<DateTime<Utc>>,
}

pub struct SubmissionOrchestrator {
    adapter: RecommendationAdapter,
    session: Mutex<Session>,
}

impl SubmissionOrchestrator {
    pub fn new(adapter: RecommendationAdapter) -> Self {
        Self {
            adapter,
            session: Mutex::new(Session::default()),
        }
    }

    /// The "on submit" callback: one external round trip, then apply-if-latest.
    ///
    /// On failure the current result is left untouched. A superseded completion is
    /// reported as `Submission::Superseded` whether it succeeded or failed.
    pub async fn submit(&self, reading: SoilReading) -> Result<Submission, RecommendationError> {
        let token = self.issue(reading).await;
        info!(token, model = self.adapter.model(), "Requesting crop recommendations");

        let outcome = self.adapter.request_recommendations(&reading).await;
        self.settle(token, outcome).await
    }

    /// The "on reset" callback: clears the current result and supersedes in-flight work.
    pub async fn reset(&self) {
        let mut session = self.session.lock().await;
        session.latest_token += 1;
        session.settled_token = session.latest_token;
        session.result = None;
        session.updated_at = Some(Utc::now());
        info!(token = session.latest_token, "Recommendation session reset");
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            reading: session.reading,
            result: session.result.clone(),
            pending: session.settled_token != session.latest_token,
            latest_token: session.latest_token,
            updated_at: session.updated_at,
        }
    }

    async fn issue(&self, reading: SoilReading) -> u64 {
        let mut session = self.session.lock().await;
        session.latest_token += 1;
        session.reading = reading;
        session.latest_token
    }

    async fn settle(
        &self,
        token: u64,
        outcome: Result<RecommendationResult, RecommendationError>,
    ) -> Result<Submission, RecommendationError> {
        let mut session = self.session.lock().await;

        if token != session.latest_token {
            debug!(
                token,
                latest = session.latest_token,
                succeeded = outcome.is_ok(),
                "Discarding stale completion"
            );
            return Ok(Submission::Superseded { token });
        }

        session.settled_token = token;
        let result = outcome?;
        session.result = Some(result.clone());
        session.updated_at = Some(Utc::now());
        info!(
            token,
            crops = result.recommendations.len(),
            "Applied crop recommendations"
        );

        Ok(Submission::Applied { token, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::llm_client::fake::{crop_payload, FakeCompletion};
    use crate::llm_client::DEFAULT_MODEL;
    use crate::recommendation::normalizer::normalize_response;

    fn orchestrator_with(fake: Arc<FakeCompletion>) -> Arc<SubmissionOrchestrator> {
        Arc::new(SubmissionOrchestrator::new(RecommendationAdapter::new(
            fake,
            DEFAULT_MODEL.to_string(),
        )))
    }

    fn result_for(names: &[&str], advice: &str) -> RecommendationResult {
        normalize_response(&crop_payload(names, advice)).unwrap()
    }

    fn reading_with_nitrogen(nitrogen: f64) -> SoilReading {
        SoilReading {
            nitrogen,
            ..SoilReading::default()
        }
    }

    fn crop_names(snapshot: &SessionSnapshot) -> Vec<String> {
        snapshot
            .result
            .as_ref()
            .map(|r| r.recommendations.iter().map(|c| c.crop_name.clone()).collect())
            .unwrap_or_default()
    }

    async fn wait_for_calls(fake: &FakeCompletion, count: usize) {
        while fake.call_count() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_default_reading_submission_applies_result() {
        let fake = Arc::new(FakeCompletion::new().with_reply(
            "",
            &crop_payload(&["Rice", "Maize", "Chickpea"], "Rotate crops yearly."),
        ));
        let orchestrator = orchestrator_with(fake.clone());

        let submission = orchestrator.submit(SoilReading::default()).await.unwrap();

        let Submission::Applied { token, result } = submission else {
            panic!("expected Applied");
        };
        assert_eq!(token, 1);
        assert_eq!(result.recommendations.len(), 3);
        assert_eq!(result.general_advice, "Rotate crops yearly.");
        assert_eq!(
            result.recommendations[0].image_url,
            "https://picsum.photos/seed/rice/800/600"
        );

        let snapshot = orchestrator.snapshot().await;
        assert_eq!(snapshot.result, Some(result));
        assert!(!snapshot.pending);
        assert!(snapshot.updated_at.is_some());
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tokens_increase_per_submission() {
        let fake = Arc::new(FakeCompletion::new().with_reply("", &crop_payload(&["Rice"], "a")));
        let orchestrator = orchestrator_with(fake);

        let first = orchestrator.submit(SoilReading::default()).await.unwrap();
        let second = orchestrator.submit(SoilReading::default()).await.unwrap();
        assert_eq!(first.token(), 1);
        assert_eq!(second.token(), 2);
    }

    #[tokio::test]
    async fn test_later_submission_completing_first_wins() {
        let fake = Arc::new(FakeCompletion::new());
        let release_first = fake.gate("Nitrogen (N): 10 mg/kg");
        let release_second = fake.gate("Nitrogen (N): 90 mg/kg");
        let orchestrator = orchestrator_with(fake.clone());

        let first = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.submit(reading_with_nitrogen(10.0)).await }
        });
        wait_for_calls(&fake, 1).await;
        let second = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.submit(reading_with_nitrogen(90.0)).await }
        });
        wait_for_calls(&fake, 2).await;
        assert!(orchestrator.snapshot().await.pending);

        release_second
            .send(Ok(crop_payload(&["Sugarcane"], "Second.")))
            .unwrap();
        let second = second.await.unwrap().unwrap();
        assert!(matches!(second, Submission::Applied { token: 2, .. }));

        release_first
            .send(Ok(crop_payload(&["Lentil"], "First.")))
            .unwrap();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first, Submission::Superseded { token: 1 });

        let snapshot = orchestrator.snapshot().await;
        assert_eq!(crop_names(&snapshot), vec!["Sugarcane"]);
        assert_eq!(snapshot.result.unwrap().general_advice, "Second.");
        assert_eq!(snapshot.reading.nitrogen, 90.0);
        assert!(!snapshot.pending);
    }

    #[tokio::test]
    async fn test_stale_completion_is_dropped_even_if_it_arrives_first() {
        let fake = Arc::new(FakeCompletion::new());
        let orchestrator = orchestrator_with(fake);

        let first = orchestrator.issue(reading_with_nitrogen(10.0)).await;
        let second = orchestrator.issue(reading_with_nitrogen(90.0)).await;

        let stale = orchestrator
            .settle(first, Ok(result_for(&["Lentil"], "First.")))
            .await
            .unwrap();
        assert_eq!(stale, Submission::Superseded { token: first });
        assert!(orchestrator.snapshot().await.result.is_none());
        assert!(orchestrator.snapshot().await.pending);

        orchestrator
            .settle(second, Ok(result_for(&["Sugarcane"], "Second.")))
            .await
            .unwrap();
        assert_eq!(crop_names(&orchestrator.snapshot().await), vec!["Sugarcane"]);
    }

    #[tokio::test]
    async fn test_stale_failure_is_not_an_error() {
        let fake = Arc::new(FakeCompletion::new());
        let orchestrator = orchestrator_with(fake);

        let first = orchestrator.issue(SoilReading::default()).await;
        let _second = orchestrator.issue(SoilReading::default()).await;

        let outcome = orchestrator
            .settle(
                first,
                Err(RecommendationError::RequestFailed("timeout".to_string())),
            )
            .await;
        assert_eq!(outcome.unwrap(), Submission::Superseded { token: first });
    }

    #[tokio::test]
    async fn test_failure_preserves_previous_result() {
        let fake = Arc::new(
            FakeCompletion::new()
                .with_api_error("Nitrogen (N): 90 mg/kg", 500, "upstream exploded")
                .with_reply("", &crop_payload(&["Rice", "Maize", "Jute"], "Keep going.")),
        );
        let orchestrator = orchestrator_with(fake);

        orchestrator.submit(SoilReading::default()).await.unwrap();
        let err = orchestrator
            .submit(reading_with_nitrogen(90.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::RequestFailed(_)));

        let snapshot = orchestrator.snapshot().await;
        assert_eq!(crop_names(&snapshot), vec!["Rice", "Maize", "Jute"]);
        assert!(!snapshot.pending);
    }

    #[tokio::test]
    async fn test_malformed_response_preserves_previous_result() {
        let fake = Arc::new(
            FakeCompletion::new()
                .with_reply("Nitrogen (N): 90 mg/kg", "not json")
                .with_reply("", &crop_payload(&["Rice"], "Keep going.")),
        );
        let orchestrator = orchestrator_with(fake);

        orchestrator.submit(SoilReading::default()).await.unwrap();
        let err = orchestrator
            .submit(reading_with_nitrogen(90.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::MalformedResponse(_)));
        assert_eq!(crop_names(&orchestrator.snapshot().await), vec!["Rice"]);
    }

    #[tokio::test]
    async fn test_reset_clears_result() {
        let fake = Arc::new(FakeCompletion::new().with_reply("", &crop_payload(&["Rice"], "a")));
        let orchestrator = orchestrator_with(fake);

        orchestrator.submit(SoilReading::default()).await.unwrap();
        orchestrator.reset().await;

        let snapshot = orchestrator.snapshot().await;
        assert!(snapshot.result.is_none());
        assert!(!snapshot.pending);
        assert_eq!(snapshot.latest_token, 2);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_submission() {
        let fake = Arc::new(FakeCompletion::new());
        let release = fake.gate("");
        let orchestrator = orchestrator_with(fake.clone());

        let in_flight = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.submit(SoilReading::default()).await }
        });
        wait_for_calls(&fake, 1).await;

        orchestrator.reset().await;
        release.send(Ok(crop_payload(&["Rice"], "late"))).unwrap();

        let outcome = in_flight.await.unwrap().unwrap();
        assert_eq!(outcome, Submission::Superseded { token: 1 });
        assert!(orchestrator.snapshot().await.result.is_none());
    }

    #[tokio::test]
    async fn test_fresh_session_snapshot() {
        let orchestrator = orchestrator_with(Arc::new(FakeCompletion::new()));
        let snapshot = orchestrator.snapshot().await;

        assert_eq!(snapshot.reading, SoilReading::default());
        assert!(snapshot.result.is_none());
        assert!(!snapshot.pending);
        assert_eq!(snapshot.latest_token, 0);
        assert!(snapshot.updated_at.is_none());
    }
}
