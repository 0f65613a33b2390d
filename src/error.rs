//! Error type for `modes-decode`.

use thiserror::Error;

/// The only failure mode that prevents producing *any* `DecodedRecord` delta.
///
/// Every other malformed-input case (bad CRC, an unpaired CPR half, an
/// unrecognized DF or TC, a metric-altitude field) is represented as absent
/// data in the returned record or an uncounted statistic, not an `Err` — see
/// `DESIGN.md` open question 10.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid message length: expected 56 or 112 bits, got {actual}")]
    InvalidLength { actual: u8 },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
