//! Decode-time configuration: unit family and correction toggles.
//!
//! Deliberately narrow — this crate takes no file I/O and parses no
//! environment variables; that's an external collaborator's job.
//! `DecodeConfig` carries only the flags the decoder itself consults.

/// Meters per foot, for `use_metric` unit conversion.
pub const METER_PER_FOOT: f64 = 0.3048;

/// Kilometers-per-hour per knot, for `use_metric` unit conversion.
pub const KPH_PER_KNOT: f64 = 1.852;

/// Flags consulted by [`crate::dispatch::decode_message`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeConfig {
    /// Store altitude/velocity/vertical_rate in the metric unit family
    /// (meters, km/h, m/min) instead of feet/knots/ft-min.
    pub use_metric: bool,
    /// Validate CRC before trusting a message's contents.
    pub check_crc: bool,
    /// Attempt single-bit CRC error correction on a CRC failure. Has no
    /// effect on DF11, where correction is always skipped regardless of
    /// this flag: a false positive there fabricates a phantom aircraft.
    pub apply_bit_err_correction: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        DecodeConfig {
            use_metric: false,
            check_crc: true,
            apply_bit_err_correction: false,
        }
    }
}
