use crate::{
    agents::error::{AgentError, insufficient_data},
    config::ClassifierConfig,
    types::{AirLabel, ClassificationResult, SensorReading},
};

/// Threshold classifier over the latest CO/CO2 values. Pure function of the
/// window contents.
pub struct ClassificationAgent {
    config: ClassifierConfig,
}

impl ClassificationAgent {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Scores every label, then picks the winner; candidates within
    /// `score_epsilon` of the best resolve to the higher-severity label.
    pub fn classify(&self, window: &[SensorReading]) -> Result<ClassificationResult, AgentError> {
        let latest = window
            .last()
            .ok_or_else(|| insufficient_data("cannot classify an empty context window"))?;

        let scores = self.candidate_scores(latest);
        let best = scores
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::MIN, f64::max);

        let (label, confidence) = scores
            .into_iter()
            .filter(|(_, score)| best - score <= self.config.score_epsilon)
            .max_by_key(|(label, _)| label.severity_rank())
            .unwrap_or((AirLabel::Unknown, 0.0));

        Ok(ClassificationResult {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }

    fn candidate_scores(&self, latest: &SensorReading) -> Vec<(AirLabel, f64)> {
        let c = &self.config;
        let co_vs_smoke = ramp(latest.co, c.clean_co, c.smoke_co);
        let co2_vs_cooking = ramp(latest.co2, c.clean_co2, c.cooking_co2);

        vec![
            (AirLabel::Fire, ramp(latest.co, c.smoke_co, c.fire_co)),
            (AirLabel::Smoke, co_vs_smoke),
            (AirLabel::Cooking, co2_vs_cooking * (1.0 - co_vs_smoke)),
            (
                AirLabel::Clean,
                (1.0 - co_vs_smoke).min(1.0 - co2_vs_cooking),
            ),
            (AirLabel::Unknown, 0.2),
        ]
    }
}

fn ramp(value: f64, low: f64, high: f64) -> f64 {
    if high <= low {
        return if value >= high { 1.0 } else { 0.0 };
    }
    ((value - low) / (high - low)).clamp(0.0, 1.0)
}
