use async_trait::async_trait;

use crate::agents::{
    error::AgentError,
    ports::{CoFeatures, SmokeScorerPort},
};

/// Deterministic logistic scorer over the CO features. Stands in for a remote
/// model service in non-production configurations; monotone in both the last
/// CO value and its slope.
pub struct ThresholdScorer {
    midpoint: f64,
    scale: f64,
    slope_weight: f64,
}

impl ThresholdScorer {
    pub fn new(midpoint: f64, scale: f64, slope_weight: f64) -> Self {
        Self {
            midpoint,
            scale: if scale <= 0.0 { 1.0 } else { scale },
            slope_weight,
        }
    }
}

impl Default for ThresholdScorer {
    fn default() -> Self {
        Self::new(200.0, 80.0, 5.0)
    }
}

#[async_trait]
impl SmokeScorerPort for ThresholdScorer {
    async fn score(&self, features: &CoFeatures) -> Result<f64, AgentError> {
        let drive = features.last + self.slope_weight * features.slope - self.midpoint;
        Ok(sigmoid(drive / self.scale))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::ThresholdScorer;
    use crate::agents::ports::{CoFeatures, SmokeScorerPort};

    fn features(last: f64, slope: f64) -> CoFeatures {
        CoFeatures {
            mean: last,
            max: last,
            last,
            slope,
            delta: 0.0,
        }
    }

    #[tokio::test]
    async fn baseline_co_scores_low_and_fire_co_scores_high() {
        let scorer = ThresholdScorer::default();
        let low = scorer
            .score(&features(5.0, 0.0))
            .await
            .expect("score should succeed");
        let high = scorer
            .score(&features(400.0, 0.0))
            .await
            .expect("score should succeed");
        assert!(low < 0.15, "baseline should score low, got {low}");
        assert!(high > 0.85, "fire-level CO should score high, got {high}");
    }

    #[tokio::test]
    async fn rising_slope_raises_the_score() {
        let scorer = ThresholdScorer::default();
        let flat = scorer
            .score(&features(150.0, 0.0))
            .await
            .expect("score should succeed");
        let rising = scorer
            .score(&features(150.0, 20.0))
            .await
            .expect("score should succeed");
        assert!(rising > flat);
    }
}
