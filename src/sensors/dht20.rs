//! DHT20 / AHT20 temperature and humidity sensor over I²C.
//!
//! Each of the two redundant sensors sits on its own bus (both parts share
//! the fixed address 0x38). One measurement:
//!
//! ```text
//!  write AC 33 00 ─▶ wait 80 ms ─▶ read 7 bytes
//!  [status][H19..12][H11..4][H3..0|T19..16][T15..8][T7..0][CRC]
//! ```
//!
//! 20-bit raw values scale as `RH = raw / 2^20 · 100` and
//! `T = raw / 2^20 · 200 − 50`.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use log::{debug, warn};

use super::{Reading, SensorChannel, SensorId};
use crate::app::ports::SensorPort;
use crate::error::{FetchError, ProbeError, ReadError};

pub const ADDRESS: u8 = 0x38;

const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];
const STATUS_BUSY: u8 = 0x80;
const STATUS_CALIBRATED: u8 = 0x08;

const CONVERSION_MS: u32 = 80;
const BUSY_POLL_MS: u32 = 10;
const BUSY_RETRIES: u8 = 3;

const FULL_SCALE: f32 = 1_048_576.0; // 2^20

/// One DHT20 on its own bus.
pub struct Dht20<I> {
    i2c: I,
    sample: Option<Reading>,
}

impl<I: I2c> Dht20<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c, sample: None }
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn status(&mut self) -> Result<u8, I::Error> {
        let mut buf = [0u8; 1];
        self.i2c.read(ADDRESS, &mut buf)?;
        Ok(buf[0])
    }

    /// Check wiring and calibration state.
    pub fn probe(&mut self) -> Result<(), ProbeError> {
        let status = self.status().map_err(|e| {
            debug!("DHT20: status read failed: {:?}", e.kind());
            ProbeError::Bus
        })?;
        if status & STATUS_CALIBRATED == 0 || status & STATUS_BUSY != 0 {
            return Err(ProbeError::NotReady);
        }
        Ok(())
    }

    /// Trigger a conversion and latch the decoded sample.
    ///
    /// The previous sample is discarded first, so a failed fetch never
    /// leaves stale data readable.
    pub fn fetch(&mut self, delay: &mut impl DelayNs) -> Result<(), FetchError> {
        self.sample = None;

        self.i2c.write(ADDRESS, &CMD_TRIGGER).map_err(bus_error)?;
        delay.delay_ms(CONVERSION_MS);

        let mut frame = [0u8; 7];
        let mut retries = 0;
        loop {
            self.i2c.read(ADDRESS, &mut frame).map_err(bus_error)?;
            if frame[0] & STATUS_BUSY == 0 {
                break;
            }
            if retries == BUSY_RETRIES {
                return Err(FetchError::new(FetchError::EBUSY));
            }
            retries += 1;
            delay.delay_ms(BUSY_POLL_MS);
        }

        if crc8(&frame[..6]) != frame[6] {
            warn!("DHT20: CRC mismatch");
            return Err(FetchError::new(FetchError::EBADMSG));
        }

        self.sample = Some(decode(&frame));
        Ok(())
    }

    pub fn channel(&self, channel: SensorChannel) -> Result<f32, ReadError> {
        let s = self.sample.ok_or(ReadError::NoSample)?;
        Ok(match channel {
            SensorChannel::Temperature => s.temperature_c,
            SensorChannel::Humidity => s.humidity_pct,
        })
    }
}

/// A NACK on the address byte means the device vanished mid-transfer.
fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> FetchError {
    match e.kind() {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address | NoAcknowledgeSource::Unknown) => {
            FetchError::new(FetchError::EIO)
        }
        _ => FetchError::new(FetchError::EREMOTEIO),
    }
}

fn decode(frame: &[u8; 7]) -> Reading {
    let raw_h = (u32::from(frame[1]) << 12) | (u32::from(frame[2]) << 4) | (u32::from(frame[3]) >> 4);
    let raw_t = ((u32::from(frame[3]) & 0x0F) << 16) | (u32::from(frame[4]) << 8) | u32::from(frame[5]);
    Reading {
        temperature_c: raw_t as f32 / FULL_SCALE * 200.0 - 50.0,
        humidity_pct: raw_h as f32 / FULL_SCALE * 100.0,
    }
}

/// CRC-8, polynomial 0x31, init 0xFF, MSB first.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// The redundant pair: one DHT20 per bus plus a shared delay source.
pub struct Dht20Pair<IA, IB, D> {
    a: Dht20<IA>,
    b: Dht20<IB>,
    delay: D,
}

impl<IA: I2c, IB: I2c, D: DelayNs> Dht20Pair<IA, IB, D> {
    pub fn new(bus_a: IA, bus_b: IB, delay: D) -> Self {
        Self {
            a: Dht20::new(bus_a),
            b: Dht20::new(bus_b),
            delay,
        }
    }
}

impl<IA: I2c, IB: I2c, D: DelayNs> SensorPort for Dht20Pair<IA, IB, D> {
    fn probe(&mut self, id: SensorId) -> Result<(), ProbeError> {
        match id {
            SensorId::A => self.a.probe(),
            SensorId::B => self.b.probe(),
        }
    }

    fn fetch(&mut self, id: SensorId) -> Result<(), FetchError> {
        match id {
            SensorId::A => self.a.fetch(&mut self.delay),
            SensorId::B => self.b.fetch(&mut self.delay),
        }
    }

    fn read_channel(&mut self, id: SensorId, channel: SensorChannel) -> Result<f32, ReadError> {
        match id {
            SensorId::A => self.a.channel(channel),
            SensorId::B => self.b.channel(channel),
        }
    }
}
