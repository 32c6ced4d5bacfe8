//! Sensor subsystem: the redundant sensor pair behind one shared bus.
//!
//! [`SensorBus`] bundles the [`SensorPort`] with the latest
//! [`HealthSnapshot`], so the enable flags are only ever read or written
//! while the bus lock is held.

pub mod aggregator;
pub mod dht20;
pub mod simulated;

use crate::app::ports::SensorPort;
use crate::health::HealthSnapshot;
use crate::sync::{self, Shared};

/// One of the two redundant sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    A,
    B,
}

impl SensorId {
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// A decodable measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Temperature,
    Humidity,
}

/// One temperature/humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl Reading {
    pub const fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            temperature_c,
            humidity_pct,
        }
    }

    /// Per-channel arithmetic mean of two samples.
    pub fn mean(a: Reading, b: Reading) -> Reading {
        Reading {
            temperature_c: (a.temperature_c + b.temperature_c) / 2.0,
            humidity_pct: (a.humidity_pct + b.humidity_pct) / 2.0,
        }
    }
}

/// Everything guarded by the sensor-bus lock.
pub struct SensorBus<P> {
    pub port: P,
    pub health: HealthSnapshot,
}

impl<P: SensorPort> SensorBus<P> {
    /// Both sensors start disabled until the first health cycle.
    pub fn new(port: P) -> Self {
        Self {
            port,
            health: HealthSnapshot::default(),
        }
    }

    /// Wrap in the shared sensor-bus lock.
    pub fn into_shared(self) -> Shared<Self> {
        sync::shared(self)
    }
}

/// Fetch one sample from `id` and decode both channels.
pub(crate) fn read_sensor<P: SensorPort>(port: &mut P, id: SensorId) -> Option<Reading> {
    if let Err(e) = port.fetch(id) {
        log::warn!("sensor {:?}: fetch failed: {}", id, e);
        return None;
    }
    let t = port.read_channel(id, SensorChannel::Temperature);
    let h = port.read_channel(id, SensorChannel::Humidity);
    match (t, h) {
        (Ok(t), Ok(h)) if t.is_finite() && h.is_finite() => Some(Reading::new(t, h)),
        _ => {
            log::warn!("sensor {:?}: channel read failed", id);
            None
        }
    }
}
