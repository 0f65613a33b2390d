//! Compact Position Reporting — CPR decode for ADS-B positions.
//!
//! Two decode modes:
//! - Global: requires an even+odd frame pair within 10 seconds. No reference needed.
//! - Local: a single frame plus a reference position within ~180nm.
//!
//! Key constants:
//! - NZ = 15 (latitude zones per hemisphere for even frames)
//! - Nb = 17 (bits per coordinate)
//! - Dlat_even = 360 / (4 * NZ) = 6.0 degrees
//! - Dlat_odd = 360 / (4 * NZ - 1) ≈ 6.1017 degrees

/// Number of latitude zones per hemisphere.
const NZ: f64 = 15.0;

/// Bits per CPR coordinate.
const NB: u32 = 17;

/// Maximum CPR value (2^17 = 131072).
const CPR_MAX: f64 = (1u32 << NB) as f64;

/// Maximum time between even/odd frames for global decode (seconds).
pub const MAX_PAIR_AGE: f64 = 10.0;

/// ICAO 1090-WP-9-14 NL transition-latitude table: `(upper_bound_inclusive, nl)`,
/// descending NL as latitude increases. Beyond the last entry (87.0°), NL is 1.
///
/// These are the exact latitudes at which `NL(lat)` steps down by one,
/// derived from the closed-form `NL(lat) = floor(2π / acos(1 - (1-cos(π/2·NZ)) / cos(lat)²))`
/// with NZ=15. Looked up with an inclusive upper bound so that a latitude
/// exactly on a breakpoint keeps the higher NL (required so that
/// `NL(87.0) == 2`, not 1).
const NL_BREAKPOINTS: [(f64, i32); 58] = [
    (10.470_471_30, 59),
    (14.828_174_37, 58),
    (18.186_263_57, 57),
    (21.029_394_93, 56),
    (23.545_044_87, 55),
    (25.829_247_07, 54),
    (27.938_987_10, 53),
    (29.911_356_86, 52),
    (31.772_097_08, 51),
    (33.539_934_36, 50),
    (35.228_995_98, 49),
    (36.850_251_08, 48),
    (38.412_418_92, 47),
    (39.922_566_84, 46),
    (41.386_518_32, 45),
    (42.809_140_12, 44),
    (44.194_549_51, 43),
    (45.546_267_23, 42),
    (46.867_332_52, 41),
    (48.160_391_28, 40),
    (49.427_764_39, 39),
    (50.671_501_66, 38),
    (51.893_424_69, 37),
    (53.095_161_53, 36),
    (54.278_174_72, 35),
    (55.443_784_44, 34),
    (56.593_187_56, 33),
    (57.727_473_54, 32),
    (58.847_637_76, 31),
    (59.954_592_77, 30),
    (61.049_177_74, 29),
    (62.132_166_59, 28),
    (63.204_274_79, 27),
    (64.266_165_23, 26),
    (65.318_453_10, 25),
    (66.361_710_08, 24),
    (67.396_467_74, 23),
    (68.423_220_22, 22),
    (69.442_426_31, 21),
    (70.454_510_75, 20),
    (71.459_864_73, 19),
    (72.458_845_45, 18),
    (73.451_774_42, 17),
    (74.438_934_16, 16),
    (75.420_562_57, 15),
    (76.396_843_91, 14),
    (77.367_894_61, 13),
    (78.333_740_83, 12),
    (79.294_282_25, 11),
    (80.249_232_13, 10),
    (81.198_013_49, 9),
    (82.139_569_81, 8),
    (83.071_994_45, 7),
    (83.991_735_63, 6),
    (84.891_661_91, 5),
    (85.755_416_21, 4),
    (86.535_369_98, 3),
    (87.000_000_00, 2),
];

/// Number of longitude zones at a given latitude (the NL function).
///
/// Ranges from 1 near the poles to 59 at the equator. Symmetric about the
/// equator; only the magnitude of `lat` matters.
pub fn nl(lat: f64) -> i32 {
    let lat = lat.abs();
    for &(boundary, nl_val) in NL_BREAKPOINTS.iter() {
        if lat <= boundary {
            return nl_val;
        }
    }
    1
}

/// Modulo that always returns a non-negative result.
fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// Global CPR decode from an even/odd frame pair.
///
/// Returns `(latitude, longitude)` in degrees, or `None` if decode fails
/// (zone boundary crossing, or the pair is older than [`MAX_PAIR_AGE`]).
pub fn global_decode(
    lat_even: u32,
    lon_even: u32,
    lat_odd: u32,
    lon_odd: u32,
    t_even: f64,
    t_odd: f64,
) -> Option<(f64, f64)> {
    if (t_even - t_odd).abs() > MAX_PAIR_AGE {
        return None;
    }

    let dlat_even = 360.0 / (4.0 * NZ); // 6.0
    let dlat_odd = 360.0 / (4.0 * NZ - 1.0); // ~6.1017

    let lat_even_cpr = lat_even as f64 / CPR_MAX;
    let lon_even_cpr = lon_even as f64 / CPR_MAX;
    let lat_odd_cpr = lat_odd as f64 / CPR_MAX;
    let lon_odd_cpr = lon_odd as f64 / CPR_MAX;

    let j = (59.0 * lat_even_cpr - 60.0 * lat_odd_cpr + 0.5).floor();

    let mut lat_e = dlat_even * (modulo(j, 60.0) + lat_even_cpr);
    let mut lat_o = dlat_odd * (modulo(j, 59.0) + lat_odd_cpr);

    if lat_e >= 270.0 {
        lat_e -= 360.0;
    }
    if lat_o >= 270.0 {
        lat_o -= 360.0;
    }

    if nl(lat_e) != nl(lat_o) {
        return None; // zone boundary crossing, pair unusable
    }

    let (lat, lon) = if t_even >= t_odd {
        let nl_val = nl(lat_e);
        let n_lon = nl_val.max(1);
        let dlon = 360.0 / n_lon as f64;
        let m = (lon_even_cpr * (nl_val - 1) as f64 - lon_odd_cpr * nl_val as f64 + 0.5).floor();
        let lon = dlon * (modulo(m, n_lon as f64) + lon_even_cpr);
        (lat_e, lon)
    } else {
        let nl_val = nl(lat_o);
        let n_lon = (nl_val - 1).max(1);
        let dlon = 360.0 / n_lon as f64;
        let m = (lon_even_cpr * (nl_val - 1) as f64 - lon_odd_cpr * nl_val as f64 + 0.5).floor();
        let lon = dlon * (modulo(m, n_lon as f64) + lon_odd_cpr);
        (lat_o, lon)
    };

    let lon = if lon >= 180.0 { lon - 360.0 } else { lon };

    Some((round3(lat), round3(lon)))
}

/// Local (relative) CPR decode using a reference position.
///
/// Valid when the aircraft is within ~180nm of the reference. The
/// longitude zone count uses `max(NL(latitude), 1)` with no odd/even
/// adjustment to the zone count itself — only the latitude zone size
/// (`dlat`) differs between odd and even frames.
pub fn local_decode(cpr_lat: u32, cpr_lon: u32, cpr_odd: bool, ref_lat: f64, ref_lon: f64) -> (f64, f64) {
    let i = if cpr_odd { 1.0 } else { 0.0 };
    let dlat = 360.0 / (4.0 * NZ - i);

    let cpr_lat_norm = cpr_lat as f64 / CPR_MAX;
    let cpr_lon_norm = cpr_lon as f64 / CPR_MAX;

    let j = (ref_lat / dlat).floor() + (modulo(ref_lat, dlat) / dlat - cpr_lat_norm + 0.5).floor();
    let lat = dlat * (j + cpr_lat_norm);

    let n_lon = nl(lat).max(1);
    let dlon = 360.0 / n_lon as f64;

    let m = (ref_lon / dlon).floor() + (modulo(ref_lon, dlon) / dlon - cpr_lon_norm + 0.5).floor();
    let mut lon = dlon * (m + cpr_lon_norm);

    let mut lat = lat;
    if lat > 90.0 {
        lat -= 360.0;
    }
    if lon >= 180.0 {
        lon -= 360.0;
    }

    (round3(lat), round3(lon))
}

/// Round to 3 decimal places.
fn round3(val: f64) -> f64 {
    (val * 1_000.0).round() / 1_000.0
}
