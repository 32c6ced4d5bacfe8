//! Sensor health supervisor.
//!
//! Runs every health cycle before any reading is trusted. Each sensor is
//! classified into exactly one [`SensorHealth`] code; the pair is then
//! cross-checked for drift.
//!
//! ## Check order
//!
//! 1. Probe: wiring fault or device not ready.
//! 2. Fetch: power loss (EIO) or any other fetch failure.
//! 3. Decode: temperature and humidity channels, independently.
//! 4. Range: −40…80 °C and 0…100 %RH, inclusive.
//!
//! The first failing step decides the status. Drift is only evaluated
//! when both sensors pass all four steps, and it never hides a worse
//! fault because it is never applied on top of one.

use core::fmt;

use log::{debug, error, info, warn};

use crate::app::ports::SensorPort;
use crate::error::ProbeError;
use crate::sensors::{Reading, SensorChannel, SensorId};

pub const TEMP_MIN_C: f32 = -40.0;
pub const TEMP_MAX_C: f32 = 80.0;
pub const HUMI_MIN_PCT: f32 = 0.0;
pub const HUMI_MAX_PCT: f32 = 100.0;

/// Default maximum disagreement between redundant sensors.
pub const DRIFT_THRESHOLD: f32 = 5.0;

/// Per-sensor status code. The discriminants are the wire codes carried
/// in the health payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SensorHealth {
    Ok = 0,
    /// Redundant sensors disagree; advisory only.
    Drift = 1,
    /// SDA/SCL wiring fault.
    BusFault = 2,
    /// Bus answers, device not ready.
    #[default]
    NotReady = 3,
    /// Device stopped answering mid-fetch (VCC/GND lost).
    PowerFault = 4,
    FetchFault = 5,
    TempReadFault = 6,
    HumiReadFault = 7,
    BothReadFault = 8,
    TempOutOfRange = 9,
    HumiOutOfRange = 10,
    BothOutOfRange = 11,
}

impl SensorHealth {
    /// Readings from this sensor may be used.
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Ok | Self::Drift)
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SensorHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Drift => "drift between redundant sensors",
            Self::BusFault => "bus/wiring fault",
            Self::NotReady => "not ready",
            Self::PowerFault => "power loss",
            Self::FetchFault => "fetch failed",
            Self::TempReadFault => "temperature decode failed",
            Self::HumiReadFault => "humidity decode failed",
            Self::BothReadFault => "both channels failed to decode",
            Self::TempOutOfRange => "temperature out of range",
            Self::HumiOutOfRange => "humidity out of range",
            Self::BothOutOfRange => "both channels out of range",
        };
        f.write_str(s)
    }
}

/// Result of checking a single sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorCheck {
    pub status: SensorHealth,
    /// Present only when `status` is `Ok`.
    pub reading: Option<Reading>,
}

impl SensorCheck {
    const fn fault(status: SensorHealth) -> Self {
        Self {
            status,
            reading: None,
        }
    }
}

/// Statuses from the most recent health cycle, kept under the bus lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthSnapshot {
    pub a: SensorHealth,
    pub b: SensorHealth,
}

impl HealthSnapshot {
    pub const fn new(a: SensorHealth, b: SensorHealth) -> Self {
        Self { a, b }
    }

    pub const fn get(&self, id: SensorId) -> SensorHealth {
        match id {
            SensorId::A => self.a,
            SensorId::B => self.b,
        }
    }

    pub const fn is_enabled(&self, id: SensorId) -> bool {
        self.get(id).is_enabled()
    }

    /// Any sensor in a state other than `Ok`.
    pub const fn has_fault(&self) -> bool {
        !matches!(self.a, SensorHealth::Ok) || !matches!(self.b, SensorHealth::Ok)
    }
}

/// Health supervisor for the redundant sensor pair.
pub struct HealthMonitor {
    drift_threshold: f32,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new(DRIFT_THRESHOLD)
    }
}

impl HealthMonitor {
    pub fn new(drift_threshold: f32) -> Self {
        Self { drift_threshold }
    }

    /// Classify one sensor. Never fails; every fault maps to a status.
    pub fn check<P: SensorPort>(&self, port: &mut P, id: SensorId) -> SensorCheck {
        // ── Probe ─────────────────────────────────────────────────
        match port.probe(id) {
            Ok(()) => {}
            Err(ProbeError::Bus) => return SensorCheck::fault(SensorHealth::BusFault),
            Err(ProbeError::NotReady) => return SensorCheck::fault(SensorHealth::NotReady),
        }

        // ── Fetch ─────────────────────────────────────────────────
        if let Err(e) = port.fetch(id) {
            let status = if e.is_power_loss() {
                SensorHealth::PowerFault
            } else {
                SensorHealth::FetchFault
            };
            return SensorCheck::fault(status);
        }

        // ── Decode ────────────────────────────────────────────────
        let temp = decode(port, id, SensorChannel::Temperature);
        let humi = decode(port, id, SensorChannel::Humidity);
        let (t, h) = match (temp, humi) {
            (Some(t), Some(h)) => (t, h),
            (None, Some(_)) => return SensorCheck::fault(SensorHealth::TempReadFault),
            (Some(_), None) => return SensorCheck::fault(SensorHealth::HumiReadFault),
            (None, None) => return SensorCheck::fault(SensorHealth::BothReadFault),
        };

        // ── Range ─────────────────────────────────────────────────
        let t_ok = (TEMP_MIN_C..=TEMP_MAX_C).contains(&t);
        let h_ok = (HUMI_MIN_PCT..=HUMI_MAX_PCT).contains(&h);
        match (t_ok, h_ok) {
            (true, true) => SensorCheck {
                status: SensorHealth::Ok,
                reading: Some(Reading::new(t, h)),
            },
            (false, true) => SensorCheck::fault(SensorHealth::TempOutOfRange),
            (true, false) => SensorCheck::fault(SensorHealth::HumiOutOfRange),
            (false, false) => SensorCheck::fault(SensorHealth::BothOutOfRange),
        }
    }

    /// Classify both sensors and cross-check them for drift.
    pub fn check_pair<P: SensorPort>(&self, port: &mut P) -> (SensorHealth, SensorHealth) {
        let a = self.check(port, SensorId::A);
        let b = self.check(port, SensorId::B);

        let (mut sa, mut sb) = (a.status, b.status);
        if let (Some(ra), Some(rb)) = (a.reading, b.reading) {
            let dt = (ra.temperature_c - rb.temperature_c).abs();
            let dh = (ra.humidity_pct - rb.humidity_pct).abs();
            if dt > self.drift_threshold || dh > self.drift_threshold {
                warn!("HEALTH | drift detected: dT={:.2} dRH={:.2}", dt, dh);
                sa = SensorHealth::Drift;
                sb = SensorHealth::Drift;
            } else {
                debug!("HEALTH | sensors agree: dT={:.2} dRH={:.2}", dt, dh);
            }
        }

        log_status(SensorId::A, sa);
        log_status(SensorId::B, sb);
        (sa, sb)
    }
}

fn decode<P: SensorPort>(port: &mut P, id: SensorId, channel: SensorChannel) -> Option<f32> {
    match port.read_channel(id, channel) {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

fn log_status(id: SensorId, status: SensorHealth) {
    match status {
        SensorHealth::Ok => debug!("HEALTH | sensor {:?}: ok", id),
        SensorHealth::Drift => info!("HEALTH | sensor {:?}: {}", id, status),
        _ => error!("HEALTH | sensor {:?}: {} (code {})", id, status, status.code()),
    }
}
