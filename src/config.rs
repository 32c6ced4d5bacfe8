//! System configuration parameters
//!
//! All tunable parameters for the sensor node and the collector.
//! Defaults match the deployed firmware; loading from storage is left to
//! the platform layer, which should call `validate()` before use.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::vtt::{DeclineRates, MaterialClass};

/// Maximum room-name length carried in payloads and registry labels.
pub const ROOM_NAME_LEN: usize = 32;

/// Sensor node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Room label carried in every outbound payload
    pub room_name: String<ROOM_NAME_LEN>,

    // --- Task periods ---
    /// Health check period (seconds)
    pub health_period_secs: u32,
    /// Raw telemetry report period (seconds)
    pub telemetry_period_secs: u32,
    /// Mold model update period (seconds)
    pub model_period_secs: u32,
    /// Hours of model time integrated per model update
    pub model_time_step_hours: f32,

    // --- Health ---
    /// Maximum |ΔT| / |ΔRH| between redundant sensors before drift
    pub drift_threshold: f32,

    // --- Mold model ---
    /// Material class of the monitored surface
    pub material: MaterialClass,
    /// Decline-phase rates (provisional, tunable per deployment)
    pub decline: DeclineRates,
}

impl NodeConfig {
    pub fn with_room(room_name: &str) -> Self {
        Self {
            room_name: truncated(room_name),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room_name.is_empty() {
            return Err(ConfigError::ValidationFailed("room_name must not be empty"));
        }
        if self.health_period_secs == 0
            || self.telemetry_period_secs == 0
            || self.model_period_secs == 0
        {
            return Err(ConfigError::ValidationFailed("task periods must be > 0"));
        }
        if !(self.model_time_step_hours.is_finite() && self.model_time_step_hours > 0.0) {
            return Err(ConfigError::ValidationFailed("model_time_step_hours must be > 0"));
        }
        if !(self.drift_threshold.is_finite() && self.drift_threshold > 0.0) {
            return Err(ConfigError::ValidationFailed("drift_threshold must be > 0"));
        }
        self.decline.validate()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            room_name: truncated("Office Room"),

            // Periods
            health_period_secs: 10,
            telemetry_period_secs: 50,
            model_period_secs: 60,
            model_time_step_hours: 1.0, // 1 real minute = 1 simulated hour

            // Health
            drift_threshold: 5.0,

            // Model
            material: MaterialClass::Sensitive,
            decline: DeclineRates::default(),
        }
    }
}

/// Collector node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Silence (milliseconds) after which a node is declared lost
    pub node_timeout_ms: u64,
    /// Watchdog scan period (milliseconds)
    pub watchdog_period_ms: u64,
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("node_timeout_ms must be > 0"));
        }
        if self.watchdog_period_ms == 0 || self.watchdog_period_ms > self.node_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_period_ms must be in 1..=node_timeout_ms",
            ));
        }
        Ok(())
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            node_timeout_ms: 15_000,
            watchdog_period_ms: 5_000,
        }
    }
}

/// Copy `s` into a fixed-capacity string, cutting at a char boundary.
pub fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    // Cannot fail: `end <= N` bytes.
    let _ = out.push_str(&s[..end]);
    out
}
