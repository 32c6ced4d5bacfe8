//! VTT mold growth model
//!
//! Forward-Euler integration of the VTT (Technical Research Centre of
//! Finland) mold index differential equation. One [`RoomModelState`] per
//! monitored room; the index is a continuous score in `[0, 6]`.
//!
//! ```text
//!  RH > RH_crit(T) ── growth:  dM = k1 · k2(M, M_max) · rate(T, RH) · dt
//!  RH ≤ RH_crit(T) ── decline: dM = decline(time_dry) · dt
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MIN_INDEX: f32 = 0.0;
pub const MAX_INDEX: f32 = 6.0;

/// Input guards: keep `ln(T)` and `ln(RH)` inside their domains.
const TEMP_MIN_C: f32 = 0.1;
const TEMP_MAX_C: f32 = 60.0;
const RH_MIN_PCT: f32 = 1.0;
const RH_MAX_PCT: f32 = 100.0;

/// Above this temperature RH_crit is flat.
const WARM_LIMIT_C: f32 = 20.0;
const RH_CRIT_WARM: f32 = 80.0;

/// Material sensitivity class of the monitored surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialClass {
    /// Pine sapwood, untreated wood, paper, drywall.
    Sensitive,
    /// Spruce, concrete, aerated concrete, glued wood.
    MediumResistant,
    /// Glass, metal, tiles, high-quality plastics.
    Resistant,
}

impl MaterialClass {
    /// Growth intensity factor.
    pub const fn k1(self) -> f32 {
        match self {
            Self::Sensitive => 1.0,
            Self::MediumResistant => 0.3,
            Self::Resistant => 0.1,
        }
    }

    /// Surface/species parameters used when none are given explicitly.
    pub const fn default_params(self) -> MaterialParams {
        match self {
            Self::Sensitive => MaterialParams {
                surface_quality: 0.0,
                wood_species: 0.0,
                rh_offset: 0.0,
            },
            Self::MediumResistant => MaterialParams {
                surface_quality: 1.0,
                wood_species: 1.0,
                rh_offset: 3.0,
            },
            Self::Resistant => MaterialParams {
                surface_quality: 1.0,
                wood_species: 1.0,
                rh_offset: 6.0,
            },
        }
    }
}

/// Static per-room surface parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    /// SQ: 0 (rough, sawn) to 1 (smooth, kiln-dried).
    pub surface_quality: f32,
    /// W: 0 (pine) to 1 (spruce).
    pub wood_species: f32,
    /// Added to the critical humidity threshold (%RH).
    pub rh_offset: f32,
}

/// Decline-phase step function over time spent dry.
///
/// These constants are provisional; deployments may retune them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeclineRates {
    /// Index/hour while `time_dry <= early_until_hours`.
    pub early: f32,
    /// Index/hour while `time_dry <= plateau_until_hours`.
    pub plateau: f32,
    /// Index/hour afterwards.
    pub late: f32,
    pub early_until_hours: f32,
    pub plateau_until_hours: f32,
}

impl Default for DeclineRates {
    fn default() -> Self {
        Self {
            early: -0.032,
            plateau: 0.0,
            late: -0.016,
            early_until_hours: 6.0,
            plateau_until_hours: 24.0,
        }
    }
}

impl DeclineRates {
    pub fn rate_for(&self, time_dry_hours: f32) -> f32 {
        if time_dry_hours <= self.early_until_hours {
            self.early
        } else if time_dry_hours <= self.plateau_until_hours {
            self.plateau
        } else {
            self.late
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [self.early, self.plateau, self.late];
        if rates.iter().any(|r| !r.is_finite() || *r > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "decline rates must be finite and <= 0",
            ));
        }
        if !(self.early_until_hours >= 0.0 && self.plateau_until_hours >= self.early_until_hours) {
            return Err(ConfigError::ValidationFailed(
                "decline phase boundaries must be ordered",
            ));
        }
        Ok(())
    }
}

/// User-facing risk level, ascending with the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum RiskLevel {
    /// M < 1: no growth.
    Clean = 0,
    /// 1 <= M < 3: microscopic growth.
    Warning = 1,
    /// 3 <= M < 4: visual growth imminent.
    Alert = 2,
    /// M >= 4: heavy visual growth.
    Critical = 3,
}

impl RiskLevel {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Model state for one room.
#[derive(Debug, Clone)]
pub struct RoomModelState {
    // --- Static configuration ---
    material: MaterialClass,
    params: MaterialParams,
    decline: DeclineRates,

    // --- Dynamic state ---
    mold_index: f32,
    rh_critical: f32,
    is_growing: bool,
    time_wet_hours: f32,
    time_dry_hours: f32,
    last_growth_rate: f32,
    max_possible_index: f32,
}

impl RoomModelState {
    /// Fresh state with the material's default surface parameters.
    pub fn new(material: MaterialClass) -> Self {
        Self::with_params(material, material.default_params(), DeclineRates::default())
    }

    pub fn with_params(material: MaterialClass, params: MaterialParams, decline: DeclineRates) -> Self {
        Self {
            material,
            params: MaterialParams {
                surface_quality: params.surface_quality.clamp(0.0, 1.0),
                wood_species: params.wood_species.clamp(0.0, 1.0),
                rh_offset: params.rh_offset,
            },
            decline,
            mold_index: MIN_INDEX,
            rh_critical: RH_CRIT_WARM + params.rh_offset,
            is_growing: false,
            time_wet_hours: 0.0,
            time_dry_hours: 0.0,
            last_growth_rate: 0.0,
            max_possible_index: 0.0,
        }
    }

    /// Integrate one step of `elapsed_hours` at the given conditions.
    ///
    /// Zero or negative elapsed time only refreshes `rh_critical`.
    /// Out-of-range conditions (infinities included) are clamped; NaN
    /// conditions and a non-finite step are ignored.
    pub fn update(&mut self, temp_c: f32, rh_pct: f32, elapsed_hours: f32) {
        if temp_c.is_nan() || rh_pct.is_nan() || !elapsed_hours.is_finite() {
            log::warn!(
                "VTT: ignoring unusable sample T={} RH={} dt={}",
                temp_c, rh_pct, elapsed_hours
            );
            return;
        }

        let t = temp_c.clamp(TEMP_MIN_C, TEMP_MAX_C);
        let rh = rh_pct.clamp(RH_MIN_PCT, RH_MAX_PCT);
        self.rh_critical = critical_humidity(t) + self.params.rh_offset;

        if elapsed_hours <= 0.0 {
            self.last_growth_rate = 0.0;
            return;
        }

        let delta = if rh > self.rh_critical {
            self.time_wet_hours += elapsed_hours;
            self.time_dry_hours = 0.0;
            self.is_growing = true;
            self.growth_delta(t, rh, elapsed_hours)
        } else {
            self.time_dry_hours += elapsed_hours;
            self.time_wet_hours = 0.0;
            self.is_growing = false;
            self.decline.rate_for(self.time_dry_hours) * elapsed_hours
        };

        self.mold_index = (self.mold_index + delta).clamp(MIN_INDEX, MAX_INDEX);
        self.last_growth_rate = delta / elapsed_hours;

        debug!(
            "VTT: T={:.1} RH={:.1} crit={:.1} growing={} M={:.3} dM/dt={:.4}",
            t, rh, self.rh_critical, self.is_growing, self.mold_index, self.last_growth_rate
        );
    }

    fn growth_delta(&mut self, t: f32, rh: f32, dt: f32) -> f32 {
        let m_max = MAX_INDEX * (rh - self.rh_critical) / (RH_MAX_PCT - self.rh_critical);
        self.max_possible_index = m_max.clamp(MIN_INDEX, MAX_INDEX);

        let exponent = -0.68 * t.ln() - 13.9 * rh.ln() + 0.14 * self.params.wood_species
            - 0.33 * self.params.surface_quality
            + 66.02;
        let base_rate = 1.0 / (7.0 * exponent.exp());

        let k1 = self.material.k1();
        // Saturation: growth stalls as M approaches M_max.
        let k2 = (1.0 - (2.3 * (self.mold_index - self.max_possible_index)).exp()).max(0.0);

        k1 * k2 * base_rate * dt
    }

    pub fn risk_level(&self) -> RiskLevel {
        risk_level_for(self.mold_index)
    }

    pub fn mold_index(&self) -> f32 {
        self.mold_index
    }

    pub fn rh_critical(&self) -> f32 {
        self.rh_critical
    }

    pub fn is_growing(&self) -> bool {
        self.is_growing
    }

    pub fn time_wet_hours(&self) -> f32 {
        self.time_wet_hours
    }

    pub fn time_dry_hours(&self) -> f32 {
        self.time_dry_hours
    }

    pub fn last_growth_rate(&self) -> f32 {
        self.last_growth_rate
    }

    pub fn max_possible_index(&self) -> f32 {
        self.max_possible_index
    }

    pub fn material(&self) -> MaterialClass {
        self.material
    }

    pub fn params(&self) -> MaterialParams {
        self.params
    }

    #[cfg(test)]
    pub(crate) fn set_mold_index(&mut self, m: f32) {
        self.mold_index = m;
    }
}

/// Base critical humidity (no material offset) at clamped temperature `t`.
pub fn critical_humidity(t: f32) -> f32 {
    if t > WARM_LIMIT_C {
        RH_CRIT_WARM
    } else {
        -0.00267 * t * t * t + 0.160 * t * t - 3.13 * t + 100.0
    }
}

/// Threshold classification, ascending with the index.
pub fn risk_level_for(mold_index: f32) -> RiskLevel {
    if mold_index < 1.0 {
        RiskLevel::Clean
    } else if mold_index < 3.0 {
        RiskLevel::Warning
    } else if mold_index < 4.0 {
        RiskLevel::Alert
    } else {
        RiskLevel::Critical
    }
}
