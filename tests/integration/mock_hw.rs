//! Mock adapters for integration tests.
//!
//! Scripted sensors, a recording transport and a collecting output sink,
//! so tests can assert on every payload without touching a real bus or
//! radio.

use std::sync::atomic::{AtomicU64, Ordering};

use moldwatch::app::ports::{Clock, OutputSink, SensorPort, Transport};
use moldwatch::collector::queue::QueuedMessage;
use moldwatch::error::{FetchError, ProbeError, ReadError, TransportError};
use moldwatch::sensors::{Reading, SensorChannel, SensorId};

// ── Scripted sensor ───────────────────────────────────────────

/// What one simulated sensor does on the next cycle.
#[derive(Debug, Clone, Copy)]
pub enum SensorScript {
    Healthy(Reading),
    ProbeFails(ProbeError),
    FetchFails(i32),
    TempUndecodable(f32),
}

pub struct ScriptedSensors {
    pub a: SensorScript,
    pub b: SensorScript,
    pub fetches: u32,
}

impl ScriptedSensors {
    pub fn healthy(a: Reading, b: Reading) -> Self {
        Self {
            a: SensorScript::Healthy(a),
            b: SensorScript::Healthy(b),
            fetches: 0,
        }
    }

    pub fn set(&mut self, id: SensorId, script: SensorScript) {
        match id {
            SensorId::A => self.a = script,
            SensorId::B => self.b = script,
        }
    }

    fn script(&self, id: SensorId) -> SensorScript {
        match id {
            SensorId::A => self.a,
            SensorId::B => self.b,
        }
    }
}

impl SensorPort for ScriptedSensors {
    fn probe(&mut self, id: SensorId) -> Result<(), ProbeError> {
        match self.script(id) {
            SensorScript::ProbeFails(e) => Err(e),
            _ => Ok(()),
        }
    }

    fn fetch(&mut self, id: SensorId) -> Result<(), FetchError> {
        self.fetches += 1;
        match self.script(id) {
            SensorScript::ProbeFails(_) => Err(FetchError::new(FetchError::EIO)),
            SensorScript::FetchFails(code) => Err(FetchError::new(code)),
            _ => Ok(()),
        }
    }

    fn read_channel(&mut self, id: SensorId, channel: SensorChannel) -> Result<f32, ReadError> {
        match (self.script(id), channel) {
            (SensorScript::Healthy(r), SensorChannel::Temperature) => Ok(r.temperature_c),
            (SensorScript::Healthy(r), SensorChannel::Humidity) => Ok(r.humidity_pct),
            (SensorScript::TempUndecodable(_), SensorChannel::Temperature) => Err(ReadError::Decode),
            (SensorScript::TempUndecodable(h), SensorChannel::Humidity) => Ok(h),
            _ => Err(ReadError::NoSample),
        }
    }
}

// ── Recording transport ───────────────────────────────────────

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<String>,
    pub fail: bool,
}

impl Transport for RecordingTransport {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Unreachable);
        }
        self.sent.push(payload.to_owned());
        Ok(())
    }
}

// ── Output sink ───────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub messages: Vec<QueuedMessage>,
}

impl OutputSink for CollectingSink {
    fn emit(&mut self, message: &QueuedMessage) {
        self.messages.push(message.clone());
    }
}

// ── Manual clock ──────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
