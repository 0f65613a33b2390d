//! Stateless field decoders: callsign, squawk formatting, ground movement
//! to speed, vertical rate, ground heading, and airborne velocity.
//!
//! Each function here operates on already-extracted byte values rather
//! than re-deriving them (that's [`crate::bits`]'s job).

use crate::bits;
use crate::gillham::parse_id13;

/// ICAO 6-bit callsign character set.
const CALLSIGN_CHARSET: &[u8; 64] =
    b"#ABCDEFGHIJKLMNOPQRSTUVWXYZ#####_###############0123456789######";

/// Decode the 48-bit callsign payload (bits 40..88 of a long message) into
/// an 8-character string, stripping the `_`/`#` padding characters.
pub fn decode_callsign(msg_bits: u128, length_bits: u8) -> String {
    let mut raw = String::with_capacity(8);
    for i in 0..8 {
        let code = bits::field(msg_bits, length_bits, 40 + i * 6, 6) as usize;
        raw.push(CALLSIGN_CHARSET[code] as char);
    }
    raw.retain(|c| c != '_' && c != '#');
    raw
}

/// Decode a raw 13-bit ID field into a 4-digit uppercase hex squawk string,
/// zero-padded.
pub fn decode_squawk(id13_field: u32) -> String {
    format!("{:04X}", parse_id13(id13_field) & 0xFFFF)
}

/// Convert a 7-bit ground movement code (1..=124; 0/125/126/127 must be
/// rejected by the caller before calling this) to ground speed in knots.
pub fn parse_movement(movement: i32) -> i32 {
    if movement > 123 {
        199 // > 175kt
    } else if movement > 108 {
        (movement - 108) * 5 + 100
    } else if movement > 93 {
        (movement - 93) * 2 + 70
    } else if movement > 38 {
        movement - 38 + 15
    } else if movement > 12 {
        ((movement - 11) >> 1) + 2
    } else if movement > 8 {
        ((movement - 6) >> 2) + 1
    } else {
        0
    }
}

/// Decode the 9-bit vertical rate field spanning bytes 8-9, in ft/min.
pub fn parse_vertical_rate(byte8: u8, byte9: u8) -> i32 {
    let mut vr = (((byte8 & 0x07) as i32) << 6) | ((byte9 >> 2) as i32);
    if vr == 0 {
        return 0;
    }
    vr -= 1;
    if byte8 & 0x08 != 0 {
        vr = -vr;
    }
    vr * 64
}

/// Decode the 7-bit ground heading field spanning bytes 5-6, in degrees.
/// Returns 0 when the heading-status bit (byte5 & 0x08) is clear.
pub fn parse_ground_heading(byte5: u8, byte6: u8) -> u32 {
    if byte5 & 0x08 == 0 {
        return 0;
    }
    let field = (((byte5 as u32) << 4) | ((byte6 as u32) >> 4)) & 0x007F;
    (field * 45) >> 4
}

/// East-west/north-south components and resolved speed/heading for a
/// ground-speed (sub-type 1-2) airborne velocity message.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundVelocity {
    pub ew_velocity: Option<i32>,
    pub ns_velocity: Option<i32>,
    pub velocity: Option<f64>,
    pub heading: Option<f64>,
}

/// Decode DF17 TC19 sub-type 1 (subsonic) or 2 (supersonic) ground-speed
/// velocity: east-west and north-south signed components, combined into a
/// magnitude/heading pair.
pub fn decode_ground_velocity(sub_type: u8, byte5: u8, byte6: u8, byte7: u8, byte8: u8) -> GroundVelocity {
    let mut out = GroundVelocity::default();

    let east_west_raw = (((byte5 & 0x03) as i32) << 8) | byte6 as i32;
    let north_south_raw = (((byte7 & 0x7F) as i32) << 3) | ((byte8 >> 5) as i32);

    let mut ew = east_west_raw - 1;
    let mut ns = north_south_raw - 1;
    if sub_type == 2 {
        ew <<= 2;
        ns <<= 2;
    }

    if east_west_raw != 0 {
        if byte5 & 0x04 != 0 {
            ew = -ew;
        }
        out.ew_velocity = Some(ew);
    }
    if north_south_raw != 0 {
        if byte7 & 0x80 != 0 {
            ns = -ns;
        }
        out.ns_velocity = Some(ns);
    }

    if east_west_raw != 0 && north_south_raw != 0 {
        let velocity = (((ns * ns) + (ew * ew)) as f64).sqrt();
        out.velocity = Some(velocity);
        if velocity != 0.0 {
            let mut heading = (ew as f64).atan2(ns as f64) * 180.0 / std::f64::consts::PI;
            if heading < 0.0 {
                heading += 360.0;
            }
            out.heading = Some(heading);
        }
    }

    out
}

/// Airspeed/heading for a DF17 TC19 sub-type 3 (subsonic) or 4 (supersonic)
/// airspeed velocity message.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AirspeedVelocity {
    pub velocity: Option<f64>,
    pub heading: Option<f64>,
}

/// Decode an airspeed-type (sub-type 3-4) velocity message. Heading is only
/// populated when the heading-status bit (byte5 & 0x04) is set, using the
/// 1024-counts-per-circle scale specific to this sub-type family.
pub fn decode_airspeed_velocity(sub_type: u8, byte5: u8, byte6: u8, byte7: u8, byte8: u8) -> AirspeedVelocity {
    let mut out = AirspeedVelocity::default();

    let mut airspeed = (((byte7 & 0x7F) as i32) << 3) | ((byte8 >> 5) as i32);
    if airspeed != 0 {
        airspeed -= 1;
        if sub_type == 4 {
            airspeed <<= 2;
        }
        out.velocity = Some(airspeed as f64);
    }

    if byte5 & 0x04 != 0 {
        let heading = ((((byte5 & 0x03) as u32) << 8 | byte6 as u32) * 45) >> 7;
        out.heading = Some(heading as f64);
    }

    out
}
