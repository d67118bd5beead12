use crate::{
    config::PolicyConfig,
    types::{ActuationState, AirLabel, ClassificationResult, PredictionResult},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyInput {
    pub classification: ClassificationResult,
    pub prediction: PredictionResult,
    pub current: ActuationState,
    /// Milliseconds since the last realized transition, on reading
    /// timestamps. `None` for a device that has never transitioned.
    pub elapsed_since_transition_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyDecision {
    pub state: ActuationState,
    pub changed: bool,
    pub severity: f64,
    pub target: ActuationState,
    /// Fire safety override took effect, bypassing dwell and stepping.
    pub forced: bool,
    /// A differing target was suppressed because the dwell time had not
    /// elapsed. Held evaluations are not audited.
    pub held_by_dwell: bool,
}

/// Debounced actuation state machine. Severity blends the predicted smoke
/// probability with the classified label severity; the realized state moves at
/// most one step toward the target per run, and non-forced transitions respect
/// the minimum dwell time.
pub struct DecisionPolicy {
    config: PolicyConfig,
}

impl DecisionPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, input: PolicyInput) -> PolicyDecision {
        let severity = self.severity(&input.classification, &input.prediction);
        let target = self.target_state(severity);

        if self.fire_override(&input.classification) {
            return PolicyDecision {
                state: ActuationState::High,
                changed: input.current != ActuationState::High,
                severity,
                target: ActuationState::High,
                forced: true,
                held_by_dwell: false,
            };
        }

        let candidate = input.current.step_toward(target);
        if candidate == input.current {
            return PolicyDecision {
                state: input.current,
                changed: false,
                severity,
                target,
                forced: false,
                held_by_dwell: false,
            };
        }

        let dwell_elapsed = match input.elapsed_since_transition_ms {
            None => true,
            Some(elapsed) => elapsed >= self.config.min_dwell_ms,
        };
        if !dwell_elapsed {
            return PolicyDecision {
                state: input.current,
                changed: false,
                severity,
                target,
                forced: false,
                held_by_dwell: true,
            };
        }

        PolicyDecision {
            state: candidate,
            changed: true,
            severity,
            target,
            forced: false,
            held_by_dwell: false,
        }
    }

    fn fire_override(&self, classification: &ClassificationResult) -> bool {
        classification.label == AirLabel::Fire
            && classification.confidence >= self.config.fire_override_confidence
    }

    fn severity(
        &self,
        classification: &ClassificationResult,
        prediction: &PredictionResult,
    ) -> f64 {
        let label_severity = label_severity(classification.label);
        self.config.probability_weight * prediction.probability
            + self.config.label_weight * label_severity
    }

    fn target_state(&self, severity: f64) -> ActuationState {
        if severity >= self.config.high_threshold {
            ActuationState::High
        } else if severity >= self.config.medium_threshold {
            ActuationState::Medium
        } else if severity >= self.config.low_threshold {
            ActuationState::Low
        } else {
            ActuationState::Off
        }
    }
}

fn label_severity(label: AirLabel) -> f64 {
    match label {
        AirLabel::Fire => 1.0,
        AirLabel::Smoke => 0.8,
        AirLabel::Cooking => 0.45,
        AirLabel::Unknown => 0.15,
        AirLabel::Clean => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::{DecisionPolicy, PolicyInput};
    use crate::{
        config::PolicyConfig,
        types::{ActuationState, AirLabel, ClassificationResult, PredictionResult},
    };

    fn policy() -> DecisionPolicy {
        DecisionPolicy::new(PolicyConfig::default())
    }

    fn input(
        label: AirLabel,
        label_confidence: f64,
        probability: f64,
        current: ActuationState,
        elapsed_ms: Option<u64>,
    ) -> PolicyInput {
        PolicyInput {
            classification: ClassificationResult {
                label,
                confidence: label_confidence,
            },
            prediction: PredictionResult {
                probability,
                confidence: 0.9,
            },
            current,
            elapsed_since_transition_ms: elapsed_ms,
        }
    }

    #[test]
    fn clean_low_probability_rests_at_off() {
        let decision = policy().evaluate(input(
            AirLabel::Clean,
            0.9,
            0.05,
            ActuationState::Off,
            None,
        ));
        assert!(!decision.changed);
        assert_eq!(decision.state, ActuationState::Off);
    }

    #[test]
    fn state_moves_one_step_toward_a_high_target() {
        let decision = policy().evaluate(input(
            AirLabel::Smoke,
            0.85,
            0.9,
            ActuationState::Off,
            None,
        ));
        assert!(decision.changed);
        assert_eq!(decision.target, ActuationState::High);
        assert_eq!(decision.state, ActuationState::Low);
    }

    #[test]
    fn dwell_suppresses_a_non_forced_transition() {
        let decision = policy().evaluate(input(
            AirLabel::Smoke,
            0.85,
            0.9,
            ActuationState::Low,
            Some(5_000),
        ));
        assert!(!decision.changed);
        assert!(decision.held_by_dwell);
        assert_eq!(decision.state, ActuationState::Low);
    }

    #[test]
    fn dwell_elapsed_allows_the_next_step() {
        let decision = policy().evaluate(input(
            AirLabel::Smoke,
            0.85,
            0.9,
            ActuationState::Low,
            Some(30_000),
        ));
        assert!(decision.changed);
        assert_eq!(decision.state, ActuationState::Medium);
    }

    #[test]
    fn confident_fire_forces_high_through_dwell_and_stepping() {
        let decision = policy().evaluate(input(
            AirLabel::Fire,
            0.95,
            0.9,
            ActuationState::Off,
            Some(1),
        ));
        assert!(decision.changed);
        assert!(decision.forced);
        assert_eq!(decision.state, ActuationState::High);
    }

    #[test]
    fn unconfident_fire_does_not_trigger_the_override() {
        let decision = policy().evaluate(input(
            AirLabel::Fire,
            0.5,
            0.2,
            ActuationState::Off,
            Some(1),
        ));
        assert!(!decision.forced);
        assert_ne!(decision.state, ActuationState::High);
    }

    #[test]
    fn falling_severity_steps_back_down() {
        let decision = policy().evaluate(input(
            AirLabel::Clean,
            0.9,
            0.02,
            ActuationState::High,
            Some(60_000),
        ));
        assert!(decision.changed);
        assert_eq!(decision.state, ActuationState::Medium);
    }
}
