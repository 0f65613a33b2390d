//! The decoded-message delta model and its raw input.
//!
//! `DecodedRecord` holds every field a decode call might learn, as typed
//! `Option`s: `None` means "not learned from this message."
//! [`DecodedRecord::merge`] implements "some overwrites none," the
//! delta-merge semantics a caller applies when folding a decode result into
//! a per-aircraft record.

/// One raw Mode-S/ADS-B transmission as handed to [`crate::dispatch::decode_message`].
///
/// `bits` is right-aligned to `length_bits` (see [`crate::bits`]); callers
/// are responsible for shifting a raw capture down to that alignment before
/// constructing a `RawMessage`. `timestamp` is a caller-supplied monotonic
/// seconds value (e.g. the SDR capture's arrival time), used only for the
/// CPR odd/even pairing window — decode itself performs no I/O and samples
/// no clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMessage {
    pub signal_strength: u8,
    pub bits: u128,
    pub length_bits: u8,
    pub timestamp: f64,
}

impl RawMessage {
    /// Derive `length_bits` from the top bit of the 5-bit DF field: DF ≥ 16
    /// is a long (112-bit) message, otherwise short (56-bit).
    pub fn length_for_df(df: u8) -> u8 {
        if df & 0x10 != 0 {
            112
        } else {
            56
        }
    }
}

/// The result of decoding one message: every field the decoder populated
/// this call, `None` everywhere else.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct DecodedRecord {
    pub signal_strength: Option<u8>,
    pub downlink_format: Option<u8>,
    pub icao24: Option<u32>,
    pub call_sign: Option<String>,
    pub squawk: Option<String>,
    pub altitude: Option<i32>,
    pub velocity: Option<f64>,
    pub heading: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub vertical_rate: Option<i32>,
    pub flight_status: Option<u8>,
    pub on_ground: Option<bool>,
    pub ew_velocity: Option<i32>,
    pub ns_velocity: Option<i32>,
    pub capability: Option<u8>,
    pub type_code: Option<u8>,
    pub emitter_category: Option<u8>,
    pub crc_sum: Option<u32>,
    pub crc_ok: Option<bool>,

    // Per-aircraft CPR pairing state.
    pub odd_raw_latitude: Option<u32>,
    pub odd_raw_longitude: Option<u32>,
    pub odd_time: Option<f64>,
    pub even_raw_latitude: Option<u32>,
    pub even_raw_longitude: Option<u32>,
    pub even_time: Option<f64>,

    /// Set by a decode call that resolved a global CPR position this call
    /// and consumed the pair. Not itself a decoded field -- a one-shot
    /// signal to [`DecodedRecord::merge`] telling it to clear the
    /// CPR-pairing fields on the merged record rather than leave them
    /// untouched. Always `false` on a freshly merged record.
    pub cpr_pair_consumed: bool,
}

/// `Some` in `delta` overwrites the corresponding field in `self`; `None`
/// in `delta` leaves `self`'s value untouched.
macro_rules! take {
    ($out:expr, $self:expr, $delta:expr, $($field:ident),+ $(,)?) => {
        $(
            $out.$field = $delta.$field.clone().or_else(|| $self.$field.clone());
        )+
    };
}

impl DecodedRecord {
    /// Merge `delta` (this call's decode result) onto `self` (the prior
    /// per-aircraft record).
    ///
    /// Every field, including the six CPR-pairing fields, follows "some
    /// overwrites none": a decode call that never touches CPR pairing (any
    /// message other than an airborne position squitter) leaves `delta`'s
    /// six pairing fields at `None`, and merging must not erase `self`'s
    /// in-progress pair just because a different message type arrived in
    /// between. The one exception is an explicit clear: when
    /// [`crate::dispatch::decode_message`] resolves a global CPR position
    /// and consumes the pair, it sets `delta.cpr_pair_consumed`, which
    /// forces the pairing fields to `None` on the merged record regardless
    /// of what `self` was carrying.
    pub fn merge(&self, delta: &DecodedRecord) -> DecodedRecord {
        let mut out = DecodedRecord::default();
        take!(
            out, self, delta,
            signal_strength,
            downlink_format,
            icao24,
            call_sign,
            squawk,
            altitude,
            velocity,
            heading,
            latitude,
            longitude,
            vertical_rate,
            flight_status,
            on_ground,
            ew_velocity,
            ns_velocity,
            capability,
            type_code,
            emitter_category,
            crc_sum,
            crc_ok,
            odd_raw_latitude,
            odd_raw_longitude,
            odd_time,
            even_raw_latitude,
            even_raw_longitude,
            even_time,
        );
        if delta.cpr_pair_consumed {
            out.clear_cpr_pair();
        }
        out
    }

    /// Clear the CPR raw-pair state, as required after a successful global
    /// decode: both timestamps reset and both raw latitude/longitude pairs
    /// cleared.
    pub fn clear_cpr_pair(&mut self) {
        self.odd_raw_latitude = None;
        self.odd_raw_longitude = None;
        self.odd_time = None;
        self.even_raw_latitude = None;
        self.even_raw_longitude = None;
        self.even_time = None;
    }
}
