//! Error types for biffbook

use thiserror::Error;

/// Result type for BIFF operations
pub type BiffResult<T> = std::result::Result<T, BiffError>;

/// Errors that can occur while decoding a BIFF record stream.
///
/// Only [`BiffError::Io`] and [`BiffError::InvalidFormat`] ever reach a
/// caller, and only from the container helper. The other variants are
/// consumed inside the parse loop: truncation drives the continuation
/// state machine and decode problems fall back to the default table.
#[derive(Debug, Error)]
pub enum BiffError {
    /// A record header or a mandatory fixed field could not be read.
    #[error("record stream truncated at offset {0}")]
    StreamTruncated(u64),

    /// A read inside a record payload ran past the end of the payload.
    #[error("record 0x{id:04X} truncated: needed {needed} bytes, {available} available")]
    RecordTruncated {
        id: u16,
        needed: usize,
        available: usize,
    },

    /// No single-byte table is known for this codepage.
    #[error("unsupported codepage {0}")]
    UnsupportedCodepage(u16),

    /// The bytes are not valid under the selected table.
    #[error("invalid byte sequence for {encoding}")]
    DecodeFailure { encoding: &'static str },

    /// IO error (also covers CFB errors which use std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid container format
    #[error("Invalid XLS format: {0}")]
    InvalidFormat(String),
}
