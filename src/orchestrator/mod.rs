use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    agents::{
        ClassificationAgent, PredictionAgent,
        error::AgentErrorKind,
    },
    ledger::{AuditLedgerClient, LedgerEventType},
    policy::{DecisionPolicy, PolicyInput},
    types::{ActuationState, ClassificationResult, DeviceId, LogIndex, PredictionResult, SensorReading},
    window::ContextWindowStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EmittedEvent {
    pub event_type: LedgerEventType,
    pub index: LogIndex,
}

/// What one pipeline run produced: the post-run actuation state, the ledger
/// events that were committed, and whether the device is running degraded.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PipelineOutcome {
    pub device_id: DeviceId,
    pub state: ActuationState,
    pub events: Vec<EmittedEvent>,
    pub degraded: bool,
    /// Appends that still failed after bounded retries. The transition is
    /// kept; the audit gap is reported, never silent.
    pub audit_failures: u32,
}

#[derive(Debug, Clone)]
struct DeviceState {
    actuation: ActuationState,
    last_transition_ms: Option<u64>,
    last_probability: Option<f64>,
    degraded: bool,
}

impl DeviceState {
    fn initial() -> Self {
        Self {
            actuation: ActuationState::Off,
            last_transition_ms: None,
            last_probability: None,
            degraded: false,
        }
    }
}

/// Sequences the pipeline for each incoming reading: context window update,
/// the two agents, the decision policy, and the audit appends. Runs for the
/// same device are serialized on a per-device lock; distinct devices proceed
/// in parallel and share nothing but the ledger sequence.
pub struct Orchestrator {
    window: Arc<ContextWindowStore>,
    classifier: ClassificationAgent,
    predictor: PredictionAgent,
    policy: DecisionPolicy,
    ledger: Arc<AuditLedgerClient>,
    devices: Mutex<HashMap<DeviceId, Arc<tokio::sync::Mutex<DeviceState>>>>,
    latest: Mutex<HashMap<DeviceId, PipelineOutcome>>,
}

impl Orchestrator {
    pub fn new(
        window: Arc<ContextWindowStore>,
        classifier: ClassificationAgent,
        predictor: PredictionAgent,
        policy: DecisionPolicy,
        ledger: Arc<AuditLedgerClient>,
    ) -> Self {
        Self {
            window,
            classifier,
            predictor,
            policy,
            ledger,
            devices: Mutex::new(HashMap::new()),
            latest: Mutex::new(HashMap::new()),
        }
    }

    /// Most recent outcome for a device, without replaying the ledger.
    pub fn latest_outcome(&self, device_id: &str) -> Option<PipelineOutcome> {
        self.latest
            .lock()
            .expect("latest outcome lock poisoned")
            .get(device_id)
            .cloned()
    }

    pub async fn handle(&self, reading: SensorReading) -> PipelineOutcome {
        let device_id = reading.device_id.clone();
        let device_handle = self.device_state(&device_id);
        let mut device = device_handle.lock().await;

        // Step 1: window update. Cannot fail; the reading is applied exactly
        // once before anything can go wrong downstream.
        self.window.record(reading.clone());
        let snapshot = self.window.snapshot(&device_id);

        let mut events = Vec::new();
        let mut audit_failures = 0u32;

        // Step 2: classification; an empty window degrades to Unknown/0.
        let classification = match self.classifier.classify(&snapshot) {
            Ok(result) => result,
            Err(err) if err.kind == AgentErrorKind::InsufficientData => {
                ClassificationResult::unknown()
            }
            Err(err) => {
                tracing::warn!(
                    target: "pipeline",
                    device_id = %device_id,
                    error = %err,
                    "classification_substituted_unknown"
                );
                ClassificationResult::unknown()
            }
        };

        // Step 3: prediction, with degraded-mode substitution of the last
        // known probability when the scorer is unreachable.
        let mut recovered = false;
        let prediction = match self.predictor.predict(&snapshot).await {
            Ok(result) => {
                if device.degraded {
                    recovered = true;
                    device.degraded = false;
                }
                device.last_probability = Some(result.probability);
                result
            }
            Err(err) if err.kind == AgentErrorKind::ModelUnavailable => {
                let substituted = device.last_probability.unwrap_or(0.0);
                tracing::warn!(
                    target: "pipeline",
                    device_id = %device_id,
                    substituted_probability = substituted,
                    error = %err,
                    "prediction_degraded"
                );
                let payload = serde_json::json!({
                    "fault_type": "model_unavailable",
                    "error": err.message,
                    "substituted_probability": substituted,
                    "had_prior_probability": device.last_probability.is_some(),
                });
                match self
                    .ledger
                    .log_fault(&device_id, reading.timestamp_ms, payload)
                    .await
                {
                    Ok(index) => events.push(EmittedEvent {
                        event_type: LedgerEventType::Fault,
                        index,
                    }),
                    Err(append_err) => {
                        audit_failures += 1;
                        tracing::error!(
                            target: "pipeline",
                            device_id = %device_id,
                            error = %append_err,
                            "fault_event_append_failed"
                        );
                    }
                }
                device.degraded = true;
                PredictionResult {
                    probability: substituted,
                    confidence: 0.0,
                }
            }
            Err(err) => {
                tracing::error!(
                    target: "pipeline",
                    device_id = %device_id,
                    error = %err,
                    "prediction_substituted_zero"
                );
                PredictionResult {
                    probability: device.last_probability.unwrap_or(0.0),
                    confidence: 0.0,
                }
            }
        };

        // Step 4: decision policy.
        let elapsed = device
            .last_transition_ms
            .map(|since| reading.timestamp_ms.saturating_sub(since));
        let decision = self.policy.evaluate(PolicyInput {
            classification,
            prediction,
            current: device.actuation,
            elapsed_since_transition_ms: elapsed,
        });

        // Step 5: audit realized transitions only.
        if decision.changed {
            let previous = device.actuation;
            tracing::info!(
                target: "pipeline",
                device_id = %device_id,
                previous_state = ?previous,
                new_state = ?decision.state,
                severity = decision.severity,
                forced = decision.forced,
                "actuation_transition"
            );
            let payload = serde_json::json!({
                "previous_state": previous,
                "new_state": decision.state,
                "label": classification.label,
                "label_confidence": classification.confidence,
                "probability": prediction.probability,
                "severity": decision.severity,
                "forced": decision.forced,
            });
            match self
                .ledger
                .log_decision(&device_id, reading.timestamp_ms, payload)
                .await
            {
                Ok(index) => events.push(EmittedEvent {
                    event_type: LedgerEventType::Decision,
                    index,
                }),
                Err(append_err) => {
                    audit_failures += 1;
                    tracing::error!(
                        target: "pipeline",
                        device_id = %device_id,
                        error = %append_err,
                        "decision_event_append_failed"
                    );
                }
            }
            device.actuation = decision.state;
            device.last_transition_ms = Some(reading.timestamp_ms);
        }

        // Step 6: report a cleared fault condition.
        if recovered {
            let payload = serde_json::json!({
                "healing": "prediction_recovered",
                "probability": prediction.probability,
            });
            match self
                .ledger
                .log_healing(&device_id, reading.timestamp_ms, payload)
                .await
            {
                Ok(index) => events.push(EmittedEvent {
                    event_type: LedgerEventType::Healing,
                    index,
                }),
                Err(append_err) => {
                    audit_failures += 1;
                    tracing::error!(
                        target: "pipeline",
                        device_id = %device_id,
                        error = %append_err,
                        "healing_event_append_failed"
                    );
                }
            }
        }

        let outcome = PipelineOutcome {
            device_id: device_id.clone(),
            state: device.actuation,
            events,
            degraded: device.degraded,
            audit_failures,
        };
        self.latest
            .lock()
            .expect("latest outcome lock poisoned")
            .insert(device_id, outcome.clone());
        outcome
    }

    fn device_state(&self, device_id: &str) -> Arc<tokio::sync::Mutex<DeviceState>> {
        let mut devices = self.devices.lock().expect("device map lock poisoned");
        devices
            .entry(device_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(DeviceState::initial())))
            .clone()
    }
}
