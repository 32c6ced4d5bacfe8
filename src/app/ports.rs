//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   SensorPort ──▶ HealthMonitor / Aggregator ──▶ Reporter ──▶ Transport
//!                                                 Collector ──▶ OutputSink
//! ```
//!
//! Driven adapters (sensor drivers, the mesh radio, the serial bridge,
//! the clock) implement these traits. The node tasks and the collector
//! consume them via generics, so the domain core never touches hardware
//! directly.

use crate::collector::queue::QueuedMessage;
use crate::error::{FetchError, ProbeError, ReadError, TransportError};
use crate::sensors::{SensorChannel, SensorId};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Access to the redundant sensor pair.
///
/// Callers hold the sensor-bus lock for the whole probe/fetch/read
/// sequence of a cycle.
pub trait SensorPort {
    /// Check that the sensor is wired and ready.
    fn probe(&mut self, id: SensorId) -> Result<(), ProbeError>;

    /// Trigger and latch a new sample.
    fn fetch(&mut self, id: SensorId) -> Result<(), FetchError>;

    /// Decode one channel of the latched sample.
    fn read_channel(&mut self, id: SensorId, channel: SensorChannel) -> Result<f32, ReadError>;
}

impl<P: SensorPort + ?Sized> SensorPort for &mut P {
    fn probe(&mut self, id: SensorId) -> Result<(), ProbeError> {
        (**self).probe(id)
    }

    fn fetch(&mut self, id: SensorId) -> Result<(), FetchError> {
        (**self).fetch(id)
    }

    fn read_channel(&mut self, id: SensorId, channel: SensorChannel) -> Result<f32, ReadError> {
        (**self).read_channel(id, channel)
    }
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → mesh radio)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget uplink to the collector. Addressing, retries and
/// acknowledgements belong to the implementation.
pub trait Transport {
    fn send(&mut self, payload: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Output sink port (driven adapter: collector → serial / dashboard)
// ───────────────────────────────────────────────────────────────

/// Final destination of every message drained from the ingest queue.
pub trait OutputSink {
    fn emit(&mut self, message: &QueuedMessage);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
