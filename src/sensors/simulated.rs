//! Simulated weather source for bench nodes without sensors attached.
//!
//! One real minute is one simulated hour; the pattern repeats every 300
//! simulated hours:
//!
//! | Hours    | Phase          | T (°C) | RH (%) |
//! |----------|----------------|--------|--------|
//! | 0–100    | tropical storm | 28     | 95     |
//! | 101–200  | dry spell      | 25     | 45     |
//! | 201–299  | freeze         | 5      | 90     |
//!
//! Both redundant sensors report the same value, so the pair never drifts.

use super::{Reading, SensorChannel, SensorId};
use crate::app::ports::{Clock, SensorPort};
use crate::error::{FetchError, ProbeError, ReadError};

const MS_PER_SIM_HOUR: u64 = 60_000;
const CYCLE_HOURS: u64 = 300;

/// Weather at simulated hour `hour` (taken modulo the cycle).
pub fn weather_at(hour: u64) -> Reading {
    match hour % CYCLE_HOURS {
        0..=100 => Reading::new(28.0, 95.0),
        101..=200 => Reading::new(25.0, 45.0),
        _ => Reading::new(5.0, 90.0),
    }
}

/// [`SensorPort`] serving the weather pattern from a [`Clock`].
pub struct SimulatedWeather<C> {
    clock: C,
    sample: Option<Reading>,
}

impl<C: Clock> SimulatedWeather<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            sample: None,
        }
    }

    pub fn sim_hour(&self) -> u64 {
        self.clock.now_ms() / MS_PER_SIM_HOUR
    }
}

impl<C: Clock> SensorPort for SimulatedWeather<C> {
    fn probe(&mut self, _id: SensorId) -> Result<(), ProbeError> {
        Ok(())
    }

    fn fetch(&mut self, _id: SensorId) -> Result<(), FetchError> {
        self.sample = Some(weather_at(self.sim_hour()));
        Ok(())
    }

    fn read_channel(&mut self, _id: SensorId, channel: SensorChannel) -> Result<f32, ReadError> {
        let s = self.sample.ok_or(ReadError::NoSample)?;
        Ok(match channel {
            SensorChannel::Temperature => s.temperature_c,
            SensorChannel::Humidity => s.humidity_pct,
        })
    }
}
