use std::sync::Arc;

use crate::{
    agents::{
        error::{AgentError, insufficient_data},
        ports::{CoFeatures, SmokeScorerPort},
    },
    types::{PredictionResult, SensorReading},
};

/// Extracts the CO-channel summary and delegates to the backing scorer.
/// Unavailability of the scorer propagates as `ModelUnavailable`; the
/// orchestrator, not this agent, decides the fallback.
pub struct PredictionAgent {
    scorer: Arc<dyn SmokeScorerPort>,
    window_capacity: usize,
}

impl PredictionAgent {
    pub fn new(scorer: Arc<dyn SmokeScorerPort>, window_capacity: usize) -> Self {
        Self {
            scorer,
            window_capacity: window_capacity.max(1),
        }
    }

    pub async fn predict(&self, window: &[SensorReading]) -> Result<PredictionResult, AgentError> {
        if window.is_empty() {
            return Err(insufficient_data("cannot predict on an empty context window"));
        }

        let features = extract_co_features(window);
        let probability = self.scorer.score(&features).await?.clamp(0.0, 1.0);

        // Confidence grows with window fullness: a single reading gives the
        // scorer almost no trend signal.
        let fullness = (window.len() as f64 / self.window_capacity as f64).min(1.0);
        let confidence = 0.6 + 0.35 * fullness;

        Ok(PredictionResult {
            probability,
            confidence,
        })
    }
}

/// Per-channel statistics restricted to CO: mean, max, last, least-squares
/// slope, and a short delta. Must stay aligned with how the scorer was
/// trained.
pub fn extract_co_features(window: &[SensorReading]) -> CoFeatures {
    let co: Vec<f64> = window.iter().map(|reading| reading.co).collect();
    let len = co.len();
    let sum: f64 = co.iter().sum();
    let mean = sum / len as f64;
    let max = co.iter().fold(f64::MIN, |acc, v| acc.max(*v));
    let last = co[len - 1];
    let slope = least_squares_slope(&co);
    let delta = if len >= 3 { last - co[len - 3] } else { 0.0 };

    CoFeatures {
        mean,
        max,
        last,
        slope,
        delta,
    }
}

fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n_f;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (index, value) in values.iter().enumerate() {
        let dx = index as f64 - x_mean;
        numerator += dx * (value - y_mean);
        denominator += dx * dx;
    }
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
