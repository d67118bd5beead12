use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    config::LedgerConfig,
    ledger::{
        error::{LedgerError, LedgerErrorKind},
        ports::LedgerStorePort,
        types::{LedgerEventType, LedgerRecord, RecordDraft},
    },
    types::LogIndex,
};

/// Client side of the audit ledger: builds records, retries appends with a
/// stable dedupe key, and serves the indexed/recency read operations.
pub struct AuditLedgerClient {
    store: Arc<dyn LedgerStorePort>,
    config: LedgerConfig,
}

impl AuditLedgerClient {
    pub fn new(store: Arc<dyn LedgerStorePort>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub async fn log_decision(
        &self,
        device_id: &str,
        timestamp_ms: u64,
        payload: Value,
    ) -> Result<LogIndex, LedgerError> {
        self.append_event(device_id, LedgerEventType::Decision, timestamp_ms, payload)
            .await
    }

    pub async fn log_fault(
        &self,
        device_id: &str,
        timestamp_ms: u64,
        payload: Value,
    ) -> Result<LogIndex, LedgerError> {
        self.append_event(device_id, LedgerEventType::Fault, timestamp_ms, payload)
            .await
    }

    pub async fn log_healing(
        &self,
        device_id: &str,
        timestamp_ms: u64,
        payload: Value,
    ) -> Result<LogIndex, LedgerError> {
        self.append_event(device_id, LedgerEventType::Healing, timestamp_ms, payload)
            .await
    }

    pub async fn get_log_count(&self) -> Result<u64, LedgerError> {
        self.store.length().await
    }

    pub async fn get_log(&self, index: LogIndex) -> Result<LedgerRecord, LedgerError> {
        self.store.get(index).await
    }

    pub async fn get_device_logs(&self, device_id: &str) -> Result<Vec<LogIndex>, LedgerError> {
        self.store.get_by_device(device_id).await
    }

    pub async fn get_recent_logs(&self, count: usize) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.store.get_recent(count).await
    }

    /// One dedupe key is generated per event and reused across attempts, so a
    /// write that landed before an ambiguous failure cannot double-record on
    /// retry.
    async fn append_event(
        &self,
        device_id: &str,
        event_type: LedgerEventType,
        timestamp_ms: u64,
        payload: Value,
    ) -> Result<LogIndex, LedgerError> {
        let draft = RecordDraft {
            device_id: device_id.to_string(),
            event_type,
            timestamp_ms,
            payload,
            writer_identity: self.config.writer_identity.clone(),
            dedupe_key: Uuid::now_v7().to_string(),
        };

        let mut last_error = None;
        for attempt in 1..=self.config.max_append_attempts {
            match self.store.append(draft.clone()).await {
                Ok(index) => {
                    tracing::debug!(
                        target: "ledger",
                        device_id = %draft.device_id,
                        event_type = ?event_type,
                        index,
                        attempt,
                        "ledger_append_committed"
                    );
                    return Ok(index);
                }
                Err(err) if err.kind == LedgerErrorKind::WriteFailed => {
                    tracing::warn!(
                        target: "ledger",
                        device_id = %draft.device_id,
                        event_type = ?event_type,
                        attempt,
                        error = %err,
                        "ledger_append_retrying"
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LedgerError::new(LedgerErrorKind::WriteFailed, "ledger append failed")
        }))
    }
}
