//! Outbound JSON payloads.
//!
//! Every node-originated payload carries `message_type`: `"ALERT"` is the
//! only user-facing fault signal, everything else is `"DATA"`. Floats are
//! rounded to two decimals before encoding.

use serde::Serialize;

use crate::health::HealthSnapshot;
use crate::model::vtt::{RiskLevel, RoomModelState};
use crate::sensors::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageType {
    #[serde(rename = "DATA")]
    Data,
    #[serde(rename = "ALERT")]
    Alert,
}

/// Payload with a fixed classification.
pub trait Classified: Serialize {
    fn message_type(&self) -> MessageType;
}

/// Encode any payload as compact JSON.
pub fn to_json<M: Serialize>(msg: &M) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

fn round2(x: f32) -> f64 {
    (f64::from(x) * 100.0).round() / 100.0
}

// ── Mold status ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MoldStatus<'a> {
    pub message_type: MessageType,
    pub room_name: &'a str,
    pub temperature: f64,
    pub humidity: f64,
    pub mold_index: f64,
    pub mold_risk_status: u8,
    pub growth_status: u8,
}

impl<'a> MoldStatus<'a> {
    /// DATA only while the room is clean and not actively growing.
    pub fn new(room_name: &'a str, reading: Reading, state: &RoomModelState) -> Self {
        let risk = state.risk_level();
        let message_type = if risk == RiskLevel::Clean && !state.is_growing() {
            MessageType::Data
        } else {
            MessageType::Alert
        };
        Self {
            message_type,
            room_name,
            temperature: round2(reading.temperature_c),
            humidity: round2(reading.humidity_pct),
            mold_index: round2(state.mold_index()),
            mold_risk_status: risk.code(),
            growth_status: u8::from(state.is_growing()),
        }
    }
}

impl Classified for MoldStatus<'_> {
    fn message_type(&self) -> MessageType {
        self.message_type
    }
}

// ── Health status ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus<'a> {
    pub message_type: MessageType,
    pub room_name: &'a str,
    pub sensor_1_status: u8,
    pub sensor_2_status: u8,
}

impl<'a> HealthStatus<'a> {
    /// ALERT whenever either sensor is not `Ok`, drift included.
    pub fn new(room_name: &'a str, health: HealthSnapshot) -> Self {
        Self {
            message_type: if health.has_fault() {
                MessageType::Alert
            } else {
                MessageType::Data
            },
            room_name,
            sensor_1_status: health.a.code(),
            sensor_2_status: health.b.code(),
        }
    }
}

impl Classified for HealthStatus<'_> {
    fn message_type(&self) -> MessageType {
        self.message_type
    }
}

// ── Simple data ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SimpleData<'a> {
    pub message_type: MessageType,
    pub room_name: &'a str,
    pub temperature: f64,
    pub humidity: f64,
}

impl<'a> SimpleData<'a> {
    pub fn new(room_name: &'a str, reading: Reading) -> Self {
        Self {
            message_type: MessageType::Data,
            room_name,
            temperature: round2(reading.temperature_c),
            humidity: round2(reading.humidity_pct),
        }
    }
}

impl Classified for SimpleData<'_> {
    fn message_type(&self) -> MessageType {
        self.message_type
    }
}

// ── Node lost (collector-originated) ────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NodeLost<'a> {
    pub event: &'static str,
    pub room: &'a str,
    pub ip: &'a str,
}

impl<'a> NodeLost<'a> {
    pub fn new(room: &'a str, ip: &'a str) -> Self {
        Self {
            event: "node_lost",
            room,
            ip,
        }
    }
}
