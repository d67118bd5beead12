pub mod client;
pub mod error;
pub mod memory;
pub mod ports;
pub mod testing;
pub mod types;

pub use client::AuditLedgerClient;
pub use error::{LedgerError, LedgerErrorKind};
pub use memory::MemoryLedger;
pub use ports::LedgerStorePort;
pub use types::{LedgerEventType, LedgerRecord, RecordDraft};
