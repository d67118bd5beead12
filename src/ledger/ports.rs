use async_trait::async_trait;

use crate::{
    ledger::{
        error::LedgerError,
        types::{LedgerRecord, RecordDraft},
    },
    types::LogIndex,
};

/// Narrow contract over the append-only ledger backend. The production
/// implementation fronts the distributed-ledger network; [`MemoryLedger`]
/// satisfies the same contract in-process.
///
/// Index assignment and the device-index update are atomic as a unit: an
/// append that assigned an index but missed the device index must never be
/// observable.
///
/// [`MemoryLedger`]: crate::ledger::MemoryLedger
#[async_trait]
pub trait LedgerStorePort: Send + Sync {
    async fn append(&self, draft: RecordDraft) -> Result<LogIndex, LedgerError>;

    async fn length(&self) -> Result<u64, LedgerError>;

    /// Fails `OutOfRange` when `index >= length`.
    async fn get(&self, index: LogIndex) -> Result<LedgerRecord, LedgerError>;

    /// Indices for a device in ascending (insertion) order; empty when none.
    async fn get_by_device(&self, device_id: &str) -> Result<Vec<LogIndex>, LedgerError>;

    /// Last `min(count, length)` records, oldest to newest within the slice.
    async fn get_recent(&self, count: usize) -> Result<Vec<LedgerRecord>, LedgerError>;
}
