use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::{
    ledger::{
        error::{LedgerError, internal_error, out_of_range},
        ports::LedgerStorePort,
        types::{LedgerRecord, RecordDraft},
    },
    types::{DeviceId, LogIndex},
};

const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Default)]
struct MemoryLedgerInner {
    entries: Vec<LedgerRecord>,
    device_index: HashMap<DeviceId, Vec<LogIndex>>,
    dedupe: HashMap<String, LogIndex>,
}

/// In-process append-only log satisfying the ledger backend contract for
/// non-production configurations. Write-once, read-many: entries are never
/// mutated or removed, and each entry's hash chains over the previous one.
///
/// One lock covers the entry list, the device index, and the dedupe map, so
/// index assignment and the device-index update commit as a unit.
pub struct MemoryLedger {
    inner: Mutex<MemoryLedgerInner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryLedgerInner::default()),
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStorePort for MemoryLedger {
    async fn append(&self, draft: RecordDraft) -> Result<LogIndex, LedgerError> {
        let mut inner = self.inner.lock().await;

        if let Some(existing) = inner.dedupe.get(&draft.dedupe_key) {
            return Ok(*existing);
        }

        let index = inner.entries.len() as LogIndex;
        let previous_hash = inner
            .entries
            .last()
            .map(|entry| entry.record_hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let record_hash = hash_record(index, &draft, &previous_hash)?;

        let record = LedgerRecord {
            index,
            device_id: draft.device_id.clone(),
            event_type: draft.event_type,
            timestamp_ms: draft.timestamp_ms,
            payload: draft.payload,
            writer_identity: draft.writer_identity,
            dedupe_key: draft.dedupe_key.clone(),
            previous_hash,
            record_hash,
        };

        inner.entries.push(record);
        inner
            .device_index
            .entry(draft.device_id)
            .or_default()
            .push(index);
        inner.dedupe.insert(draft.dedupe_key, index);

        Ok(index)
    }

    async fn length(&self) -> Result<u64, LedgerError> {
        Ok(self.inner.lock().await.entries.len() as u64)
    }

    async fn get(&self, index: LogIndex) -> Result<LedgerRecord, LedgerError> {
        let inner = self.inner.lock().await;
        inner.entries.get(index as usize).cloned().ok_or_else(|| {
            out_of_range(format!(
                "log index {index} out of range (length {})",
                inner.entries.len()
            ))
        })
    }

    async fn get_by_device(&self, device_id: &str) -> Result<Vec<LogIndex>, LedgerError> {
        let inner = self.inner.lock().await;
        Ok(inner.device_index.get(device_id).cloned().unwrap_or_default())
    }

    async fn get_recent(&self, count: usize) -> Result<Vec<LedgerRecord>, LedgerError> {
        let inner = self.inner.lock().await;
        let start = inner.entries.len().saturating_sub(count);
        Ok(inner.entries[start..].to_vec())
    }
}

fn hash_record(
    index: LogIndex,
    draft: &RecordDraft,
    previous_hash: &str,
) -> Result<String, LedgerError> {
    let body = serde_json::json!({
        "index": index,
        "device_id": draft.device_id,
        "event_type": draft.event_type,
        "timestamp_ms": draft.timestamp_ms,
        "payload": draft.payload,
        "writer_identity": draft.writer_identity,
        "dedupe_key": draft.dedupe_key,
        "previous_hash": previous_hash,
    });
    let canonical = serde_json::to_vec(&body)
        .map_err(|err| internal_error(format!("failed to canonicalize ledger record: {err}")))?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::{GENESIS_HASH, MemoryLedger};
    use crate::ledger::{
        ports::LedgerStorePort,
        types::{LedgerEventType, RecordDraft},
    };

    fn draft(device_id: &str, dedupe_key: &str) -> RecordDraft {
        RecordDraft {
            device_id: device_id.to_string(),
            event_type: LedgerEventType::Decision,
            timestamp_ms: 1_000,
            payload: serde_json::json!({"new_state": "high"}),
            writer_identity: "test-writer".to_string(),
            dedupe_key: dedupe_key.to_string(),
        }
    }

    #[tokio::test]
    async fn appends_assign_contiguous_indices() {
        let ledger = MemoryLedger::new();
        for expected in 0..4u64 {
            let index = ledger
                .append(draft("dev-1", &format!("key-{expected}")))
                .await
                .expect("append should succeed");
            assert_eq!(index, expected);
        }
        assert_eq!(ledger.length().await.expect("length should succeed"), 4);
    }

    #[tokio::test]
    async fn duplicate_dedupe_key_returns_the_original_index() {
        let ledger = MemoryLedger::new();
        let first = ledger
            .append(draft("dev-1", "key-a"))
            .await
            .expect("append should succeed");
        let replay = ledger
            .append(draft("dev-1", "key-a"))
            .await
            .expect("replay should succeed");
        assert_eq!(first, replay);
        assert_eq!(ledger.length().await.expect("length should succeed"), 1);
    }

    #[tokio::test]
    async fn hash_chain_links_every_record_to_its_predecessor() {
        let ledger = MemoryLedger::new();
        ledger
            .append(draft("dev-1", "key-a"))
            .await
            .expect("append should succeed");
        ledger
            .append(draft("dev-2", "key-b"))
            .await
            .expect("append should succeed");

        let first = ledger.get(0).await.expect("get should succeed");
        let second = ledger.get(1).await.expect("get should succeed");
        assert_eq!(first.previous_hash, GENESIS_HASH);
        assert_eq!(second.previous_hash, first.record_hash);
        assert_ne!(second.record_hash, first.record_hash);
    }
}
