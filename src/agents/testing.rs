//! Scorer doubles for tests and degraded-path exercises.

use std::{
    collections::VecDeque,
    sync::Mutex,
};

use async_trait::async_trait;

use crate::agents::{
    error::{AgentError, model_unavailable},
    ports::{CoFeatures, SmokeScorerPort},
    scorer::ThresholdScorer,
};

/// Always fails with `ModelUnavailable`.
pub struct UnavailableScorer;

#[async_trait]
impl SmokeScorerPort for UnavailableScorer {
    async fn score(&self, _features: &CoFeatures) -> Result<f64, AgentError> {
        Err(model_unavailable("scorer backend is unreachable"))
    }
}

/// Replays queued responses in order; once the queue drains it behaves like
/// the default [`ThresholdScorer`]. Lets tests script an outage and recovery
/// around otherwise-deterministic scoring.
pub struct ScriptedScorer {
    responses: Mutex<VecDeque<Result<f64, AgentError>>>,
    fallback: ThresholdScorer,
}

impl ScriptedScorer {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: ThresholdScorer::default(),
        }
    }

    pub fn push_probability(&self, probability: f64) {
        self.responses
            .lock()
            .expect("scripted scorer lock poisoned")
            .push_back(Ok(probability));
    }

    pub fn push_unavailable(&self) {
        self.responses
            .lock()
            .expect("scripted scorer lock poisoned")
            .push_back(Err(model_unavailable("scripted scorer outage")));
    }
}

impl Default for ScriptedScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmokeScorerPort for ScriptedScorer {
    async fn score(&self, features: &CoFeatures) -> Result<f64, AgentError> {
        let scripted = self
            .responses
            .lock()
            .expect("scripted scorer lock poisoned")
            .pop_front();
        match scripted {
            Some(response) => response,
            None => self.fallback.score(features).await,
        }
    }
}
