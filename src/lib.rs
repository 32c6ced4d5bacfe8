//! MoldWatch firmware library.
//!
//! Sensor-node pipeline (health supervision, redundant reading
//! aggregation, VTT mold model, reporting) and the collector side
//! (node registry, liveness watchdog, ingest queue). Hardware, radio and
//! clock access go through the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod collector;
pub mod config;
pub mod error;
pub mod health;
pub mod model;
pub mod sensors;
pub mod sync;

pub use error::{Error, Result};
