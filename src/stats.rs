//! Process-wide aggregate statistics, injected as a sink rather than a
//! global.
//!
//! A pure decode function can't reach out to global mutable state, so the
//! counters become a trait the caller implements and passes in.
//! [`AtomicStats`] is a ready-made implementation for callers (and tests)
//! that don't want to write their own.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// The counters a decode call may update. Implementors decide how to store
/// and surface them; the decoder only ever calls `inc`/`observe_min`/
/// `observe_max`/`add_member`.
pub trait StatsSink {
    fn inc(&mut self, counter: &str);
    fn observe_min(&mut self, field: &str, value: f64);
    fn observe_max(&mut self, field: &str, value: f64);
    fn add_member(&mut self, set: &str, value: &str);
}

/// A sink that discards every update. Useful for callers that don't care
/// about aggregate statistics, and for tests that only care about the
/// returned `DecodedRecord`.
#[derive(Debug, Default)]
pub struct NullStats;

impl StatsSink for NullStats {
    fn inc(&mut self, _counter: &str) {}
    fn observe_min(&mut self, _field: &str, _value: f64) {}
    fn observe_max(&mut self, _field: &str, _value: f64) {}
    fn add_member(&mut self, _set: &str, _value: &str) {}
}

#[derive(Debug)]
struct Bounds {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        }
    }
}

/// Reference `StatsSink` implementation: per-DF counters, CRC pass/fail
/// totals, observed lat/lon bounds, and the sets of known ICAO24 addresses
/// and callsigns.
#[derive(Debug, Default)]
pub struct AtomicStats {
    df_counts: [AtomicU64; 32],
    df_total: AtomicU64,
    valid_crc: AtomicU64,
    not_valid_crc: AtomicU64,
    bounds: Mutex<Bounds>,
    icao24: Mutex<HashSet<String>>,
    flights: Mutex<HashSet<String>>,
}

impl AtomicStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn df_count(&self, df: u8) -> u64 {
        self.df_counts[df as usize & 0x1F].load(Ordering::Relaxed)
    }

    pub fn df_total(&self) -> u64 {
        self.df_total.load(Ordering::Relaxed)
    }

    pub fn valid_crc(&self) -> u64 {
        self.valid_crc.load(Ordering::Relaxed)
    }

    pub fn not_valid_crc(&self) -> u64 {
        self.not_valid_crc.load(Ordering::Relaxed)
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let b = self.bounds.lock().unwrap();
        (b.min_lat, b.max_lat, b.min_lon, b.max_lon)
    }

    pub fn icao_count(&self) -> usize {
        self.icao24.lock().unwrap().len()
    }

    pub fn flight_count(&self) -> usize {
        self.flights.lock().unwrap().len()
    }
}

impl StatsSink for AtomicStats {
    fn inc(&mut self, counter: &str) {
        match counter {
            "df_total" => {
                self.df_total.fetch_add(1, Ordering::Relaxed);
            }
            "valid_crc" => {
                self.valid_crc.fetch_add(1, Ordering::Relaxed);
            }
            "not_valid_crc" => {
                self.not_valid_crc.fetch_add(1, Ordering::Relaxed);
            }
            name => {
                if let Some(df_str) = name.strip_prefix("df_") {
                    if let Ok(df) = df_str.parse::<usize>() {
                        if df < 32 {
                            self.df_counts[df].fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            }
        }
    }

    fn observe_min(&mut self, field: &str, value: f64) {
        let mut b = self.bounds.lock().unwrap();
        match field {
            "lat" => b.min_lat = b.min_lat.min(value),
            "lon" => b.min_lon = b.min_lon.min(value),
            _ => {}
        }
    }

    fn observe_max(&mut self, field: &str, value: f64) {
        let mut b = self.bounds.lock().unwrap();
        match field {
            "lat" => b.max_lat = b.max_lat.max(value),
            "lon" => b.max_lon = b.max_lon.max(value),
            _ => {}
        }
    }

    fn add_member(&mut self, set: &str, value: &str) {
        match set {
            "icao24" => {
                self.icao24.lock().unwrap().insert(value.to_string());
            }
            "flights" => {
                self.flights.lock().unwrap().insert(value.to_string());
            }
            _ => {}
        }
    }
}
