use serde::{Deserialize, Serialize};

pub type DeviceId = String;
pub type LogIndex = u64;

/// One validated reading from a field device. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub device_id: DeviceId,
    /// Carbon monoxide channel, ppm equivalent.
    pub co: f64,
    /// Carbon dioxide channel, ppm equivalent.
    pub co2: f64,
    /// Milliseconds since the Unix epoch. Defaults to receipt time at the
    /// ingestion boundary when the device omits it.
    pub timestamp_ms: u64,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirLabel {
    Clean,
    Cooking,
    Smoke,
    Fire,
    Unknown,
}

impl AirLabel {
    /// Severity ordering used for epsilon tie-breaks and the policy blend:
    /// Fire > Smoke > Cooking > Clean > Unknown is the tie-break order, while
    /// the numeric weight feeds the severity score.
    pub fn severity_rank(self) -> u8 {
        match self {
            AirLabel::Fire => 4,
            AirLabel::Smoke => 3,
            AirLabel::Cooking => 2,
            AirLabel::Clean => 1,
            AirLabel::Unknown => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: AirLabel,
    /// In [0, 1].
    pub confidence: f64,
}

impl ClassificationResult {
    pub fn unknown() -> Self {
        Self {
            label: AirLabel::Unknown,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Smoke/fire probability in [0, 1].
    pub probability: f64,
    /// In [0, 1].
    pub confidence: f64,
}

/// Fan actuation state. OFF is both the initial state for a new device and a
/// valid resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuationState {
    Off,
    Low,
    Medium,
    High,
}

impl ActuationState {
    pub fn step_toward(self, target: ActuationState) -> ActuationState {
        use ActuationState::{High, Low, Medium, Off};
        match target.cmp(&self) {
            std::cmp::Ordering::Equal => self,
            std::cmp::Ordering::Greater => match self {
                Off => Low,
                Low => Medium,
                Medium | High => High,
            },
            std::cmp::Ordering::Less => match self {
                High => Medium,
                Medium => Low,
                Low | Off => Off,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ActuationState::{High, Low, Medium, Off};

    #[test]
    fn step_toward_moves_one_level_at_a_time() {
        assert_eq!(Off.step_toward(High), Low);
        assert_eq!(Low.step_toward(High), Medium);
        assert_eq!(Medium.step_toward(High), High);
        assert_eq!(High.step_toward(Off), Medium);
        assert_eq!(Low.step_toward(Low), Low);
    }
}
