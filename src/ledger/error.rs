use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorKind {
    /// Read past the end of the log. Surfaced to the caller, never retried.
    OutOfRange,
    /// Append failed; retryable with the same dedupe key.
    WriteFailed,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerError {
    pub kind: LedgerErrorKind,
    pub message: String,
}

impl LedgerError {
    pub fn new(kind: LedgerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LedgerError {}

pub fn out_of_range(message: impl Into<String>) -> LedgerError {
    LedgerError::new(LedgerErrorKind::OutOfRange, message)
}

pub fn write_failed(message: impl Into<String>) -> LedgerError {
    LedgerError::new(LedgerErrorKind::WriteFailed, message)
}

pub fn internal_error(message: impl Into<String>) -> LedgerError {
    LedgerError::new(LedgerErrorKind::Internal, message)
}
