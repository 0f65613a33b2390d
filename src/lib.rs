//! modes-decode: pure Mode S / ADS-B downlink message decoder.
//!
//! No demodulation, no track store, no I/O — just the decode: CRC
//! validation with single-bit correction, Gillham altitude, CPR position,
//! and DF/TC dispatch across the 32 downlink formats.

pub mod altitude;
pub mod bits;
pub mod config;
pub mod cpr;
pub mod crc;
pub mod dispatch;
pub mod error;
pub mod fields;
pub mod gillham;
pub mod record;
pub mod stats;

pub use config::DecodeConfig;
pub use dispatch::decode_message;
pub use error::{DecodeError, Result};
pub use record::{DecodedRecord, RawMessage};
pub use stats::{AtomicStats, NullStats, StatsSink};
