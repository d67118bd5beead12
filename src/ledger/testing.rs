//! Store doubles exercising the retry and idempotence paths.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::{
    ledger::{
        error::{LedgerError, write_failed},
        memory::MemoryLedger,
        ports::LedgerStorePort,
        types::{LedgerRecord, RecordDraft},
    },
    types::LogIndex,
};

/// Wraps a [`MemoryLedger`] and simulates ambiguous append failures: the
/// write lands, then the call reports `WriteFailed` anyway. A retry with the
/// same dedupe key must find exactly one stored record.
pub struct FlakyStore {
    inner: MemoryLedger,
    ambiguous_failures_remaining: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryLedger::new(),
            ambiguous_failures_remaining: AtomicU32::new(0),
        }
    }

    pub fn fail_next_appends_ambiguously(&self, count: u32) {
        self.ambiguous_failures_remaining
            .store(count, Ordering::SeqCst);
    }
}

impl Default for FlakyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStorePort for FlakyStore {
    async fn append(&self, draft: RecordDraft) -> Result<LogIndex, LedgerError> {
        let index = self.inner.append(draft).await?;
        let remaining = self.ambiguous_failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.ambiguous_failures_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(write_failed(
                "simulated ambiguous failure after the write landed",
            ));
        }
        Ok(index)
    }

    async fn length(&self) -> Result<u64, LedgerError> {
        self.inner.length().await
    }

    async fn get(&self, index: LogIndex) -> Result<LedgerRecord, LedgerError> {
        self.inner.get(index).await
    }

    async fn get_by_device(&self, device_id: &str) -> Result<Vec<LogIndex>, LedgerError> {
        self.inner.get_by_device(device_id).await
    }

    async fn get_recent(&self, count: usize) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.inner.get_recent(count).await
    }
}
