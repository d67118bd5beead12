use async_trait::async_trait;

use crate::agents::error::AgentError;

/// Monotone summary of the CO channel, matching the per-channel statistics the
/// backing scorer was trained on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoFeatures {
    pub mean: f64,
    pub max: f64,
    pub last: f64,
    /// Least-squares slope over the window, per tick.
    pub slope: f64,
    /// Short-horizon delta: last value minus the value three ticks back.
    pub delta: f64,
}

/// Boundary to the pretrained smoke scorer. A pure scoring function with no
/// side effects; unavailability must surface as `ModelUnavailable`, never as a
/// low probability.
#[async_trait]
pub trait SmokeScorerPort: Send + Sync {
    async fn score(&self, features: &CoFeatures) -> Result<f64, AgentError>;
}
