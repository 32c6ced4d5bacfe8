//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to                      |
//! |------------|-------------|----------------------------------|
//! | `log_sink` | OutputSink  | Serial/console log output        |
//! | `loopback` | Transport   | In-process collector (simulator) |
//! | `time`     | Clock       | Monotonic system timer           |
//!
//! Sensor adapters live under [`crate::sensors`] (`dht20`, `simulated`).

pub mod log_sink;
pub mod loopback;
pub mod time;
