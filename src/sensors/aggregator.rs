//! Reading aggregation over the redundant pair.
//!
//! | A enabled | B enabled | Mode        | Result            |
//! |-----------|-----------|-------------|-------------------|
//! | yes       | yes       | Redundant   | per-channel mean  |
//! | yes / no  | no / yes  | Failover    | the healthy one   |
//! | no        | no        | Unavailable | `None`, skip      |
//!
//! Must be called with the sensor-bus lock held; it touches the port.

use log::{debug, warn};

use super::{read_sensor, Reading, SensorBus, SensorId};
use crate::app::ports::SensorPort;
use crate::health::HealthSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    Redundant,
    Failover(SensorId),
    Unavailable,
}

impl AggregationMode {
    pub fn from_snapshot(health: &HealthSnapshot) -> Self {
        match (health.is_enabled(SensorId::A), health.is_enabled(SensorId::B)) {
            (true, true) => Self::Redundant,
            (true, false) => Self::Failover(SensorId::A),
            (false, true) => Self::Failover(SensorId::B),
            (false, false) => Self::Unavailable,
        }
    }
}

/// Read the enabled sensors according to the last health snapshot.
///
/// `None` means "skip this cycle": no model update and no report.
pub fn read<P: SensorPort>(bus: &mut SensorBus<P>) -> Option<Reading> {
    let mode = AggregationMode::from_snapshot(&bus.health);
    let port = &mut bus.port;

    match mode {
        AggregationMode::Redundant => {
            let a = read_sensor(port, SensorId::A);
            let b = read_sensor(port, SensorId::B);
            match (a, b) {
                (Some(a), Some(b)) => {
                    debug!("AGG | redundant: A={:?} B={:?}", a, b);
                    Some(Reading::mean(a, b))
                }
                (Some(r), None) | (None, Some(r)) => {
                    warn!("AGG | redundant read degraded to one sensor");
                    Some(r)
                }
                (None, None) => {
                    warn!("AGG | both sensors failed mid-cycle");
                    None
                }
            }
        }
        AggregationMode::Failover(id) => {
            let r = read_sensor(port, id);
            if r.is_none() {
                warn!("AGG | failover sensor {:?} failed mid-cycle", id);
            }
            r
        }
        AggregationMode::Unavailable => {
            debug!("AGG | no enabled sensor");
            None
        }
    }
}
