//! Fake completion port for tests.
//!
//! Replies are matched by checking whether the prompt contains a registered substring.
//! A gated reply blocks until the test releases it, which lets tests decide the order
//! in which concurrent calls complete.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use super::{CompletionRequest, LlmError, StructuredCompletion};

pub type GateSender = oneshot::Sender<Result<String, LlmError>>;

enum Reply {
    Text(String),
    Api { status: u16, message: String },
    Empty,
    Gated(oneshot::Receiver<Result<String, LlmError>>),
}

impl Reply {
    /// Non-gated replies can be served any number of times.
    fn ready(&self) -> Option<Result<String, LlmError>> {
        match self {
            Reply::Text(text) => Some(Ok(text.clone())),
            Reply::Api { status, message } => Some(Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            })),
            Reply::Empty => Some(Err(LlmError::EmptyContent)),
            Reply::Gated(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub response_schema: Value,
}

#[derive(Default)]
pub struct FakeCompletion {
    rules: Mutex<Vec<(String, Reply)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` to prompts containing `prompt_contains` ("" matches everything).
    pub fn with_reply(self, prompt_contains: &str, text: &str) -> Self {
        self.push(prompt_contains, Reply::Text(text.to_string()));
        self
    }

    pub fn with_api_error(self, prompt_contains: &str, status: u16, message: &str) -> Self {
        self.push(
            prompt_contains,
            Reply::Api {
                status,
                message: message.to_string(),
            },
        );
        self
    }

    pub fn with_empty_content(self, prompt_contains: &str) -> Self {
        self.push(prompt_contains, Reply::Empty);
        self
    }

    /// Registers a one-shot reply that is held back until the returned sender fires.
    pub fn gate(&self, prompt_contains: &str) -> GateSender {
        let (tx, rx) = oneshot::channel();
        self.push(prompt_contains, Reply::Gated(rx));
        tx
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, prompt_contains: &str, reply: Reply) {
        self.rules
            .lock()
            .unwrap()
            .push((prompt_contains.to_string(), reply));
    }
}

#[async_trait]
impl StructuredCompletion for FakeCompletion {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: request.model.to_string(),
            prompt: request.prompt.to_string(),
            response_schema: request.response_schema.clone(),
        });

        let gated = {
            let mut rules = self.rules.lock().unwrap();
            let index = rules
                .iter()
                .position(|(pattern, _)| request.prompt.contains(pattern.as_str()));
            let Some(index) = index else {
                return Err(LlmError::Api {
                    status: 404,
                    message: "FakeCompletion: no reply configured for prompt".to_string(),
                });
            };
            if let Some(ready) = rules[index].1.ready() {
                return ready;
            }
            match rules.remove(index).1 {
                Reply::Gated(rx) => rx,
                _ => unreachable!("only gated replies are removed"),
            }
        };

        gated.await.unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// A schema-conforming payload with one crop per name.
pub fn crop_payload(names: &[&str], advice: &str) -> String {
    let crops: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "cropName": name,
                "confidence": 0.82,
                "description": format!("{name} grows well in balanced loam."),
                "growingTips": [
                    "Prepare a fine seedbed",
                    "Irrigate during flowering",
                    "Scout weekly for pests"
                ],
                "optimalConditions": {"soil": "Loamy, pH 6-7", "climate": "Warm and humid"},
                "marketValue": "High",
                "imageUrl": format!("{name} field")
            })
        })
        .collect();
    json!({"recommendations": crops, "generalAdvice": advice}).to_string()
}
