//! The DF/TC router: `decode_message`, the crate's single public entry
//! point, tying every other module together.

use crate::altitude::{parse_ac12, parse_ac13};
use crate::bits;
use crate::config::{DecodeConfig, KPH_PER_KNOT, METER_PER_FOOT};
use crate::cpr;
use crate::crc;
use crate::error::{DecodeError, Result};
use crate::fields::{
    decode_airspeed_velocity, decode_callsign, decode_ground_velocity, decode_squawk, parse_ground_heading,
    parse_movement, parse_vertical_rate,
};
use crate::record::{DecodedRecord, RawMessage};
use crate::stats::StatsSink;

const TC_IDENTIFICATION: std::ops::RangeInclusive<u8> = 1..=4;
const TC_SURFACE_POSITION: std::ops::RangeInclusive<u8> = 5..=8;
const TC_AIRBORNE_POSITION_BARO_LOW: std::ops::RangeInclusive<u8> = 9..=18;
const TC_AIRBORNE_POSITION_BARO_HIGH: std::ops::RangeInclusive<u8> = 20..=22;
const TC_AIRBORNE_VELOCITY: u8 = 19;
const TC_TEST_SQUAWK: u8 = 23;
const TC_EXT_SQUITTER_AIRCRAFT_STATUS: u8 = 28;
const TC_TARGET_STATE_STATUS: u8 = 29;

fn is_airborne_position(tc: u8) -> bool {
    TC_AIRBORNE_POSITION_BARO_LOW.contains(&tc) || TC_AIRBORNE_POSITION_BARO_HIGH.contains(&tc)
}

/// Decode one Mode-S/ADS-B message into a `DecodedRecord` delta.
///
/// `prior` is the caller's current record for this aircraft (or
/// `DecodedRecord::default()` for a never-before-seen address); it is read
/// but never mutated — the decoder is a pure function, callers own
/// serializing access to the per-aircraft record they fold the result into
/// with [`DecodedRecord::merge`].
pub fn decode_message(
    raw: &RawMessage,
    prior: &DecodedRecord,
    config: &DecodeConfig,
    stats: &mut dyn StatsSink,
) -> Result<DecodedRecord> {
    if raw.length_bits != 56 && raw.length_bits != 112 {
        return Err(DecodeError::InvalidLength { actual: raw.length_bits });
    }

    let mut msg_bits = raw.bits;
    let length_bits = raw.length_bits;
    let df = bits::field(msg_bits, length_bits, 0, 5) as u8;

    let mut delta = DecodedRecord::default();
    delta.signal_strength = Some(raw.signal_strength);
    delta.downlink_format = Some(df);

    // Bits 1-3 address formats carry the ICAO address directly; the other
    // dispatched DFs XOR-fold it into the parity field instead, recoverable
    // only from the CRC residual.
    let address_is_explicit = matches!(df, 11 | 17 | 18);

    // `check_crc=false` means "skip CRC, accept all": no residual is
    // computed, no bit-error correction is attempted, and `msg_bits` is
    // never substituted, matching `crc_ok` defaulting true so the
    // correction branch below can't fire.
    let mut crc_sum = 0u32;
    let mut crc_ok = true;

    if config.check_crc {
        crc_sum = crc::crc24(msg_bits, length_bits);
        crc_ok = if address_is_explicit { crc::is_valid(msg_bits, length_bits) } else { true };

        if !crc_ok && config.apply_bit_err_correction && df != 11 {
            // Correction is always skipped for DF11: a false positive there
            // fabricates a phantom aircraft.
            if let Some(fixed) = crc::try_fix(msg_bits, length_bits) {
                msg_bits = fixed;
                crc_sum = crc::crc24(msg_bits, length_bits);
                crc_ok = true;
            }
        }

        delta.crc_sum = Some(crc_sum);
        delta.crc_ok = Some(crc_ok);
        stats.inc(if crc_ok { "valid_crc" } else { "not_valid_crc" });
    } else {
        delta.crc_sum = Some(0);
        delta.crc_ok = Some(true);
    }

    if config.check_crc && !crc_ok {
        // Uncorrectable CRC failure: stop here, without touching the
        // aircraft record. `delta` carries only signal_strength/
        // downlink_format/crc_sum/crc_ok -- no ICAO24, no DF-body fields.
        stats.inc(&format!("df_{df}"));
        stats.inc("df_total");
        return Ok(delta);
    }

    if prior.icao24.is_none() {
        // For implicit-address DFs the ICAO24 only exists inside the CRC
        // residual; with `check_crc=false` that residual was never
        // computed, so there is nothing to recover it from.
        let icao = if address_is_explicit {
            Some(
                (bits::byte(msg_bits, length_bits, 1) as u32) << 16
                    | (bits::byte(msg_bits, length_bits, 2) as u32) << 8
                    | bits::byte(msg_bits, length_bits, 3) as u32,
            )
        } else if config.check_crc {
            Some(crc::icao_from_residual(msg_bits, length_bits))
        } else {
            None
        };
        if let Some(icao) = icao {
            delta.icao24 = Some(icao);
            stats.add_member("icao24", &format!("{icao:06X}"));
        }
    }

    let capability = bits::byte(msg_bits, length_bits, 0) & 0x07;
    let type_code = bits::byte(msg_bits, length_bits, 4) >> 3;
    let emitter_category = bits::byte(msg_bits, length_bits, 4) & 0x07;
    delta.capability = Some(capability);
    delta.type_code = Some(type_code);
    delta.emitter_category = Some(emitter_category);

    match df {
        0 => {
            decode_altitude(msg_bits, length_bits, config, &mut delta);
        }
        4 => {
            decode_altitude(msg_bits, length_bits, config, &mut delta);
            decode_flight_status(msg_bits, length_bits, &mut delta);
        }
        5 => {
            decode_identity(msg_bits, length_bits, &mut delta);
            decode_flight_status(msg_bits, length_bits, &mut delta);
        }
        11 => {
            // All-call reply: nothing beyond ICAO24 to decode.
        }
        16 => {
            decode_altitude(msg_bits, length_bits, config, &mut delta);
        }
        17 => {
            delta = decode_adsb_message(msg_bits, length_bits, type_code, prior, raw.timestamp, config, stats, delta);
        }
        18 => {
            if matches!(capability, 0 | 1 | 6) {
                delta =
                    decode_adsb_message(msg_bits, length_bits, type_code, prior, raw.timestamp, config, stats, delta);
            }
        }
        20 => {
            decode_comm_b_callsign(msg_bits, length_bits, stats, &mut delta);
            decode_altitude(msg_bits, length_bits, config, &mut delta);
            decode_flight_status(msg_bits, length_bits, &mut delta);
        }
        21 => {
            decode_comm_b_callsign(msg_bits, length_bits, stats, &mut delta);
            decode_identity(msg_bits, length_bits, &mut delta);
            decode_flight_status(msg_bits, length_bits, &mut delta);
        }
        _ => {
            // Downlink format not covered by the dispatch table; nothing
            // more can be learned from this message.
        }
    }

    stats.inc(&format!("df_{df}"));
    stats.inc("df_total");

    Ok(delta)
}

fn decode_altitude(msg_bits: u128, length_bits: u8, config: &DecodeConfig, delta: &mut DecodedRecord) {
    let ac13 = (bits::field(msg_bits, length_bits, 19, 13)) as u32;
    if ac13 != 0 {
        let feet = parse_ac13(ac13);
        delta.altitude = Some(convert_altitude(config, feet));
    }
}

fn decode_identity(msg_bits: u128, length_bits: u8, delta: &mut DecodedRecord) {
    let id13 = bits::field(msg_bits, length_bits, 19, 13) as u32;
    delta.squawk = Some(decode_squawk(id13));
}

fn decode_flight_status(msg_bits: u128, length_bits: u8, delta: &mut DecodedRecord) {
    delta.flight_status = Some(bits::byte(msg_bits, length_bits, 0) & 0x07);
}

fn decode_comm_b_callsign(msg_bits: u128, length_bits: u8, stats: &mut dyn StatsSink, delta: &mut DecodedRecord) {
    // BDS 2,0 (Aircraft Identification) register.
    if bits::byte(msg_bits, length_bits, 4) == 0x20 {
        let call_sign = decode_callsign(msg_bits, length_bits);
        stats.add_member("flights", &call_sign);
        delta.call_sign = Some(call_sign);
    }
}

fn convert_altitude(config: &DecodeConfig, feet: i32) -> i32 {
    if config.use_metric {
        (METER_PER_FOOT * feet as f64).round() as i32
    } else {
        feet
    }
}

fn convert_velocity_knots(config: &DecodeConfig, knots: f64) -> f64 {
    if config.use_metric {
        (KPH_PER_KNOT * knots).round()
    } else {
        knots.round()
    }
}

fn convert_vertical_rate(config: &DecodeConfig, ft_per_min: i32) -> i32 {
    if config.use_metric {
        (METER_PER_FOOT * ft_per_min as f64).round() as i32
    } else {
        ft_per_min
    }
}

/// Sub-type extraction is a 2-bit field at a different offset for TC29 than
/// the regular 3-bit sub-type used everywhere else, TC19 included.
fn sub_type_for(type_code: u8, byte4: u8) -> u8 {
    if type_code == TC_TARGET_STATE_STATUS {
        (byte4 & 0x06) >> 1
    } else {
        byte4 & 0x07
    }
}

/// TC-based ADS-B message body (DF17, or DF18 with capability in {0,1,6}).
#[allow(clippy::too_many_arguments)]
fn decode_adsb_message(
    msg_bits: u128,
    length_bits: u8,
    type_code: u8,
    prior: &DecodedRecord,
    timestamp: f64,
    config: &DecodeConfig,
    stats: &mut dyn StatsSink,
    mut delta: DecodedRecord,
) -> DecodedRecord {
    let byte4 = bits::byte(msg_bits, length_bits, 4);
    let byte5 = bits::byte(msg_bits, length_bits, 5);
    let byte6 = bits::byte(msg_bits, length_bits, 6);
    let byte7 = bits::byte(msg_bits, length_bits, 7);
    let byte8 = bits::byte(msg_bits, length_bits, 8);
    let byte9 = bits::byte(msg_bits, length_bits, 9);

    let sub_type = sub_type_for(type_code, byte4);

    if TC_IDENTIFICATION.contains(&type_code) {
        let call_sign = decode_callsign(msg_bits, length_bits);
        stats.add_member("flights", &call_sign);
        delta.call_sign = Some(call_sign);
    }

    if type_code == TC_AIRBORNE_VELOCITY {
        if (1..=4).contains(&sub_type) {
            let vr = parse_vertical_rate(byte8, byte9);
            if vr != 0 {
                delta.vertical_rate = Some(convert_vertical_rate(config, vr));
            }
        }
        if (1..=2).contains(&sub_type) {
            let gv = decode_ground_velocity(sub_type, byte5, byte6, byte7, byte8);
            delta.ew_velocity = gv.ew_velocity;
            delta.ns_velocity = gv.ns_velocity;
            if let Some(velocity) = gv.velocity {
                delta.velocity = Some(convert_velocity_knots(config, velocity));
                if let Some(heading) = gv.heading {
                    delta.heading = Some(heading.round());
                }
            }
        }
        if (3..=4).contains(&sub_type) {
            let av = decode_airspeed_velocity(sub_type, byte5, byte6, byte7, byte8);
            // Airspeed sub-types are reported as-is; unlike groundspeed,
            // no metric conversion is applied here.
            delta.velocity = av.velocity;
            delta.heading = av.heading;
        }
    }

    if TC_SURFACE_POSITION.contains(&type_code) || is_airborne_position(type_code) {
        if is_airborne_position(type_code) {
            let ac12 = (((byte5 as u32) << 4) | (byte6 as u32) >> 4) & 0x0FFF;
            if ac12 != 0 {
                let feet = parse_ac12(ac12);
                delta.altitude = Some(convert_altitude(config, feet));
            }
            delta.on_ground = Some(false);
        } else {
            let movement = (((byte4 as u32) << 4) | (byte5 as u32) >> 4) & 0x007F;
            if movement > 0 && movement < 125 {
                let knots = parse_movement(movement as i32);
                delta.velocity = Some(convert_velocity_knots(config, knots as f64));
            } else {
                delta.velocity = Some(convert_velocity_knots(config, 0.0));
            }
            delta.heading = Some(parse_ground_heading(byte5, byte6) as f64);
            delta.on_ground = Some(true);
        }

        if is_airborne_position(type_code) {
            let odd = byte6 & 0x04 != 0;
            let lat = (((byte6 & 0x03) as u32) << 15) | ((byte7 as u32) << 7) | ((byte8 as u32) >> 1);
            let lon = (((byte8 & 0x01) as u32) << 16) | ((byte9 as u32) << 8) | bits::byte(msg_bits, length_bits, 10) as u32;

            delta = resolve_position(prior, delta, odd, lat, lon, timestamp, stats);
        }
    }

    if type_code == TC_TEST_SQUAWK && sub_type == 7 {
        let id13 = (((byte5 as u32) << 8) | byte6 as u32) & 0xFFF1;
        let id13 = id13 >> 3;
        if id13 != 0 {
            delta.squawk = Some(decode_squawk(id13));
        }
    }

    if type_code == TC_EXT_SQUITTER_AIRCRAFT_STATUS && sub_type == 1 {
        let id13 = (((byte5 as u32) << 8) | byte6 as u32) & 0x1FFF;
        if id13 != 0 {
            delta.squawk = Some(decode_squawk(id13));
        }
    }

    delta
}

/// Fold this message's observed CPR side into the aircraft's pairing
/// state, and attempt to resolve a position from it.
///
/// Tries a global (even+odd) decode first; on success the pairing state is
/// cleared. Otherwise falls back to a relative decode against the
/// previously known position, if any, preferring whichever side of the
/// pair just arrived.
fn resolve_position(
    prior: &DecodedRecord,
    mut delta: DecodedRecord,
    odd: bool,
    raw_lat: u32,
    raw_lon: u32,
    timestamp: f64,
    stats: &mut dyn StatsSink,
) -> DecodedRecord {
    let mut odd_raw_latitude = prior.odd_raw_latitude;
    let mut odd_raw_longitude = prior.odd_raw_longitude;
    let mut odd_time = prior.odd_time;
    let mut even_raw_latitude = prior.even_raw_latitude;
    let mut even_raw_longitude = prior.even_raw_longitude;
    let mut even_time = prior.even_time;

    if odd {
        odd_raw_latitude = Some(raw_lat);
        odd_raw_longitude = Some(raw_lon);
        odd_time = Some(timestamp);
    } else {
        even_raw_latitude = Some(raw_lat);
        even_raw_longitude = Some(raw_lon);
        even_time = Some(timestamp);
    }

    if let (Some(elat), Some(elon), Some(et), Some(olat), Some(olon), Some(ot)) =
        (even_raw_latitude, even_raw_longitude, even_time, odd_raw_latitude, odd_raw_longitude, odd_time)
    {
        if let Some((lat, lon)) = cpr::global_decode(elat, elon, olat, olon, et, ot) {
            delta.latitude = Some(lat);
            delta.longitude = Some(lon);
            observe_position(stats, lat, lon);
            // Pair consumed: `cpr_pair_consumed` makes `DecodedRecord::merge`
            // clear the pairing fields instead of leaving them untouched.
            delta.clear_cpr_pair();
            delta.cpr_pair_consumed = true;
            return delta;
        }
    }

    delta.odd_raw_latitude = odd_raw_latitude;
    delta.odd_raw_longitude = odd_raw_longitude;
    delta.odd_time = odd_time;
    delta.even_raw_latitude = even_raw_latitude;
    delta.even_raw_longitude = even_raw_longitude;
    delta.even_time = even_time;

    if let (Some(ref_lat), Some(ref_lon)) = (prior.latitude, prior.longitude) {
        let resolved = if odd_time.is_some() {
            odd_raw_latitude.zip(odd_raw_longitude).map(|(lat, lon)| cpr::local_decode(lat, lon, true, ref_lat, ref_lon))
        } else {
            even_raw_latitude
                .zip(even_raw_longitude)
                .map(|(lat, lon)| cpr::local_decode(lat, lon, false, ref_lat, ref_lon))
        };
        if let Some((lat, lon)) = resolved {
            delta.latitude = Some(lat);
            delta.longitude = Some(lon);
            observe_position(stats, lat, lon);
        }
    }

    delta
}

fn observe_position(stats: &mut dyn StatsSink, lat: f64, lon: f64) {
    stats.observe_min("lat", lat);
    stats.observe_max("lat", lat);
    stats.observe_min("lon", lon);
    stats.observe_max("lon", lon);
}
