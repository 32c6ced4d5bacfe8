//! The three periodic units of a sensor node.
//!
//! ```text
//!  HealthTask    (10 s) ─ bus: check_pair, store snapshot ─ radio: health status
//!  TelemetryTask (50 s) ─ bus: aggregate                  ─ radio: simple data
//!  MoldTask      (60 s) ─ bus: aggregate ─ VTT update     ─ radio: mold status
//! ```
//!
//! Each `run_cycle` takes the sensor-bus lock, reads, releases it, and
//! only then reports. The caller owns scheduling.

use heapless::String;
use log::{info, warn};

use super::messages::{HealthStatus, MoldStatus, SimpleData};
use super::ports::{SensorPort, Transport};
use super::reporter::Reporter;
use crate::config::{NodeConfig, ROOM_NAME_LEN};
use crate::health::{HealthMonitor, HealthSnapshot};
use crate::model::vtt::{RiskLevel, RoomModelState};
use crate::sensors::{aggregator, Reading, SensorBus};
use crate::sync::{self, Shared};

type Room = String<ROOM_NAME_LEN>;

/// Read through the aggregator under the bus lock.
fn read_shared<P: SensorPort>(bus: &Shared<SensorBus<P>>) -> Option<Reading> {
    let mut guard = sync::lock_blocking(bus);
    aggregator::read(&mut *guard)
}

// ───────────────────────────────────────────────────────────────
// Health
// ───────────────────────────────────────────────────────────────

pub struct HealthTask<P, T> {
    bus: Shared<SensorBus<P>>,
    reporter: Reporter<T>,
    monitor: HealthMonitor,
    room: Room,
}

impl<P: SensorPort, T: Transport> HealthTask<P, T> {
    pub fn new(config: &NodeConfig, bus: Shared<SensorBus<P>>, reporter: Reporter<T>) -> Self {
        Self {
            bus,
            reporter,
            monitor: HealthMonitor::new(config.drift_threshold),
            room: config.room_name.clone(),
        }
    }

    /// Check both sensors, publish the enable flags, report the result.
    pub fn run_cycle(&mut self) -> HealthSnapshot {
        let snapshot = {
            let mut bus = sync::lock_blocking(&self.bus);
            let (a, b) = self.monitor.check_pair(&mut bus.port);
            bus.health = HealthSnapshot::new(a, b);
            bus.health
        };

        self.reporter
            .report(&HealthStatus::new(&self.room, snapshot));
        snapshot
    }
}

// ───────────────────────────────────────────────────────────────
// Telemetry
// ───────────────────────────────────────────────────────────────

pub struct TelemetryTask<P, T> {
    bus: Shared<SensorBus<P>>,
    reporter: Reporter<T>,
    room: Room,
}

impl<P: SensorPort, T: Transport> TelemetryTask<P, T> {
    pub fn new(config: &NodeConfig, bus: Shared<SensorBus<P>>, reporter: Reporter<T>) -> Self {
        Self {
            bus,
            reporter,
            room: config.room_name.clone(),
        }
    }

    /// Report raw temperature/humidity; skipped when no sensor is enabled.
    pub fn run_cycle(&mut self) -> Option<Reading> {
        let Some(reading) = read_shared(&self.bus) else {
            warn!("TELEMETRY | skipped: sensors unavailable");
            return None;
        };
        self.reporter.report(&SimpleData::new(&self.room, reading));
        Some(reading)
    }
}

// ───────────────────────────────────────────────────────────────
// Mold model
// ───────────────────────────────────────────────────────────────

pub struct MoldTask<P, T> {
    bus: Shared<SensorBus<P>>,
    reporter: Reporter<T>,
    state: RoomModelState,
    step_hours: f32,
    room: Room,
}

impl<P: SensorPort, T: Transport> MoldTask<P, T> {
    pub fn new(config: &NodeConfig, bus: Shared<SensorBus<P>>, reporter: Reporter<T>) -> Self {
        let material = config.material;
        Self {
            bus,
            reporter,
            state: RoomModelState::with_params(material, material.default_params(), config.decline),
            step_hours: config.model_time_step_hours,
            room: config.room_name.clone(),
        }
    }

    /// Advance the model by one step and report; skipped when unavailable.
    pub fn run_cycle(&mut self) -> Option<RiskLevel> {
        let Some(reading) = read_shared(&self.bus) else {
            warn!("VTT | skipped: sensors unavailable");
            return None;
        };

        self.state
            .update(reading.temperature_c, reading.humidity_pct, self.step_hours);
        let risk = self.state.risk_level();
        info!(
            "VTT | M={:.2} risk={:?} growing={}",
            self.state.mold_index(),
            risk,
            self.state.is_growing()
        );

        self.reporter
            .report(&MoldStatus::new(&self.room, reading, &self.state));
        Some(risk)
    }

    pub fn state(&self) -> &RoomModelState {
        &self.state
    }
}
