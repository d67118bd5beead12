use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{DeviceId, LogIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEventType {
    Decision,
    Fault,
    Healing,
}

/// What a writer submits. The store assigns the index and the hash chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub device_id: DeviceId,
    pub event_type: LedgerEventType,
    pub timestamp_ms: u64,
    pub payload: Value,
    pub writer_identity: String,
    /// Client-generated key; an append retried with the same key after an
    /// ambiguous failure stores exactly one record.
    pub dedupe_key: String,
}

/// Immutable once appended. Ordering is the log index: strictly monotonic,
/// never reused or deleted. `record_hash` chains over `previous_hash` and the
/// canonical record body, making silent mutation detectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub index: LogIndex,
    pub device_id: DeviceId,
    pub event_type: LedgerEventType,
    pub timestamp_ms: u64,
    pub payload: Value,
    pub writer_identity: String,
    pub dedupe_key: String,
    pub previous_hash: String,
    pub record_hash: String,
}
