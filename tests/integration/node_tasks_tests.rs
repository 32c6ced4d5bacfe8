//! Integration tests for the sensor-node pipeline:
//! SensorPort → HealthTask → aggregator → {TelemetryTask, MoldTask} → Transport.

use std::sync::Arc;
use std::thread;

use crate::mock_hw::{RecordingTransport, ScriptedSensors, SensorScript};

use moldwatch::app::ports::Transport;
use moldwatch::app::reporter::Reporter;
use moldwatch::app::tasks::{HealthTask, MoldTask, TelemetryTask};
use moldwatch::config::NodeConfig;
use moldwatch::error::{FetchError, ProbeError, TransportError};
use moldwatch::health::SensorHealth;
use moldwatch::model::RiskLevel;
use moldwatch::sensors::{Reading, SensorBus, SensorId};
use moldwatch::sync::{lock_blocking, Shared};

type Bus = Shared<SensorBus<ScriptedSensors>>;

fn node(a: Reading, b: Reading) -> (NodeConfig, Bus, Reporter<RecordingTransport>) {
    let cfg = NodeConfig::with_room("Bathroom");
    let bus = SensorBus::new(ScriptedSensors::healthy(a, b)).into_shared();
    let reporter = Reporter::new(RecordingTransport::default());
    (cfg, bus, reporter)
}

fn sent(reporter: &Reporter<RecordingTransport>) -> Vec<String> {
    lock_blocking(reporter.radio()).sent.clone()
}

// ── Redundant sensors within tolerance ────────────────────────

#[test]
fn close_readings_are_averaged_and_reported_as_data() {
    let (cfg, bus, reporter) = node(Reading::new(24.0, 60.0), Reading::new(24.2, 61.0));
    let mut health = HealthTask::new(&cfg, bus.clone(), reporter.clone());
    let mut telem = TelemetryTask::new(&cfg, bus, reporter.clone());

    let snap = health.run_cycle();
    assert_eq!((snap.a, snap.b), (SensorHealth::Ok, SensorHealth::Ok));

    let r = telem.run_cycle().expect("both sensors enabled");
    assert!((r.temperature_c - 24.1).abs() < 1e-4);
    assert!((r.humidity_pct - 60.5).abs() < 1e-4);

    let out = sent(&reporter);
    assert_eq!(
        out[0],
        r#"{"message_type":"DATA","room_name":"Bathroom","sensor_1_status":0,"sensor_2_status":0}"#
    );
    assert_eq!(
        out[1],
        r#"{"message_type":"DATA","room_name":"Bathroom","temperature":24.1,"humidity":60.5}"#
    );
}

// ── Drift stays enabled but alerts ────────────────────────────

#[test]
fn drift_keeps_both_sensors_enabled() {
    let (cfg, bus, reporter) = node(Reading::new(24.0, 60.0), Reading::new(31.0, 60.0));
    let mut health = HealthTask::new(&cfg, bus.clone(), reporter.clone());
    let mut telem = TelemetryTask::new(&cfg, bus, reporter.clone());

    let snap = health.run_cycle();
    assert_eq!((snap.a, snap.b), (SensorHealth::Drift, SensorHealth::Drift));
    assert_eq!(telem.run_cycle(), Some(Reading::new(27.5, 60.0)));
    assert!(sent(&reporter)[0].contains(r#""message_type":"ALERT""#));
}

// ── Failover ──────────────────────────────────────────────────

#[test]
fn power_fault_on_b_fails_over_to_a() {
    let (cfg, bus, reporter) = node(Reading::new(21.0, 55.0), Reading::new(21.0, 55.0));
    lock_blocking(&bus)
        .port
        .set(SensorId::B, SensorScript::FetchFails(FetchError::EIO));

    let mut health = HealthTask::new(&cfg, bus.clone(), reporter.clone());
    let mut telem = TelemetryTask::new(&cfg, bus.clone(), reporter.clone());

    let snap = health.run_cycle();
    assert_eq!(snap.b, SensorHealth::PowerFault);
    assert!(sent(&reporter)[0].contains(r#""sensor_2_status":4"#));

    let before = lock_blocking(&bus).port.fetches;
    assert_eq!(telem.run_cycle(), Some(Reading::new(21.0, 55.0)));
    assert_eq!(lock_blocking(&bus).port.fetches - before, 1, "only A is read");
}

#[test]
fn decode_fault_is_classified_per_channel() {
    let (cfg, bus, reporter) = node(Reading::new(21.0, 55.0), Reading::new(21.0, 55.0));
    lock_blocking(&bus)
        .port
        .set(SensorId::A, SensorScript::TempUndecodable(55.0));
    let snap = HealthTask::new(&cfg, bus, reporter).run_cycle();
    assert_eq!(snap.a, SensorHealth::TempReadFault);
    assert_eq!(snap.b, SensorHealth::Ok);
}

#[test]
fn recovered_sensor_is_re_enabled_next_cycle() {
    let (cfg, bus, reporter) = node(Reading::new(20.0, 50.0), Reading::new(20.0, 50.0));
    lock_blocking(&bus)
        .port
        .set(SensorId::A, SensorScript::ProbeFails(ProbeError::Bus));
    let mut health = HealthTask::new(&cfg, bus.clone(), reporter);

    assert_eq!(health.run_cycle().a, SensorHealth::BusFault);
    lock_blocking(&bus)
        .port
        .set(SensorId::A, SensorScript::Healthy(Reading::new(20.0, 50.0)));
    assert_eq!(health.run_cycle().a, SensorHealth::Ok);
}

// ── Nothing available ─────────────────────────────────────────

#[test]
fn no_enabled_sensor_skips_model_and_reports() {
    let (cfg, bus, reporter) = node(Reading::new(20.0, 50.0), Reading::new(20.0, 50.0));
    {
        let mut b = lock_blocking(&bus);
        b.port.set(SensorId::A, SensorScript::ProbeFails(ProbeError::NotReady));
        b.port.set(SensorId::B, SensorScript::ProbeFails(ProbeError::Bus));
    }
    let mut health = HealthTask::new(&cfg, bus.clone(), reporter.clone());
    let mut telem = TelemetryTask::new(&cfg, bus.clone(), reporter.clone());
    let mut mold = MoldTask::new(&cfg, bus, reporter.clone());

    health.run_cycle();
    assert_eq!(telem.run_cycle(), None);
    assert_eq!(mold.run_cycle(), None);
    assert_eq!(mold.state().time_wet_hours(), 0.0);
    assert_eq!(mold.state().time_dry_hours(), 0.0);

    let out = sent(&reporter);
    assert_eq!(out.len(), 1, "only the health alert goes out");
    assert!(out[0].contains(r#""sensor_1_status":3,"sensor_2_status":2"#));
}

// ── Warm, wet room ────────────────────────────────────────────

#[test]
fn warm_wet_room_reaches_critical_within_100_hours() {
    let wet = Reading::new(28.0, 95.0);
    let (cfg, bus, reporter) = node(wet, wet);
    HealthTask::new(&cfg, bus.clone(), reporter.clone()).run_cycle();
    let mut mold = MoldTask::new(&cfg, bus, reporter.clone());

    let mut prev = 0.0_f32;
    for hour in 1..=100 {
        mold.run_cycle().expect("sensors healthy");
        let m = mold.state().mold_index();
        assert!(mold.state().is_growing(), "hour {hour}: must be growing");
        assert!(m >= prev, "hour {hour}: index fell from {prev} to {m}");
        assert!(m <= 6.0);
        if hour <= 40 {
            assert!(m > prev, "hour {hour}: early growth must be strict");
        }
        prev = m;
    }
    assert_eq!(mold.state().risk_level(), RiskLevel::Critical);

    let out = sent(&reporter);
    let last = out.last().unwrap();
    assert!(last.contains(r#""message_type":"ALERT""#));
    assert!(last.contains(r#""mold_risk_status":3,"growth_status":1"#));
}

// ── Transport failure is invisible ────────────────────────────

#[test]
fn failed_delivery_does_not_disturb_the_pipeline() {
    let (cfg, bus, reporter) = node(Reading::new(20.0, 50.0), Reading::new(20.0, 50.0));
    lock_blocking(reporter.radio()).fail = true;

    HealthTask::new(&cfg, bus.clone(), reporter.clone()).run_cycle();
    let mut mold = MoldTask::new(&cfg, bus, reporter.clone());
    assert_eq!(mold.run_cycle(), Some(RiskLevel::Clean));
    assert!(sent(&reporter).is_empty());
}

// ── Lock discipline ───────────────────────────────────────────

/// Transport that checks whether the sensor bus is free while it sends.
struct BusCheckingTransport {
    bus: Bus,
    sends: u32,
    bus_held: u32,
}

impl Transport for BusCheckingTransport {
    fn send(&mut self, _payload: &str) -> Result<(), TransportError> {
        self.sends += 1;
        if self.bus.try_lock().is_err() {
            self.bus_held += 1;
        }
        Ok(())
    }
}

#[test]
fn bus_lock_is_released_before_sending() {
    let cfg = NodeConfig::with_room("Bathroom");
    let bus = SensorBus::new(ScriptedSensors::healthy(
        Reading::new(26.0, 90.0),
        Reading::new(26.0, 90.0),
    ))
    .into_shared();
    let reporter = Reporter::new(BusCheckingTransport {
        bus: bus.clone(),
        sends: 0,
        bus_held: 0,
    });

    let mut health = HealthTask::new(&cfg, bus.clone(), reporter.clone());
    let mut telem = TelemetryTask::new(&cfg, bus.clone(), reporter.clone());
    let mut mold = MoldTask::new(&cfg, bus, reporter.clone());
    for _ in 0..3 {
        health.run_cycle();
        telem.run_cycle();
        mold.run_cycle();
    }

    let radio = lock_blocking(reporter.radio());
    assert_eq!(radio.sends, 9);
    assert_eq!(radio.bus_held, 0);
}

// ── Concurrency ───────────────────────────────────────────────

#[test]
fn tasks_share_bus_and_radio_without_deadlock() {
    let (cfg, bus, reporter) = node(Reading::new(22.0, 70.0), Reading::new(22.5, 70.5));
    let mut health = HealthTask::new(&cfg, bus.clone(), reporter.clone());
    health.run_cycle();

    let cfg = Arc::new(cfg);
    let mut handles = Vec::new();
    {
        let (cfg, bus, reporter) = (Arc::clone(&cfg), bus.clone(), reporter.clone());
        handles.push(thread::spawn(move || {
            let mut h = HealthTask::new(&cfg, bus, reporter);
            for _ in 0..50 {
                h.run_cycle();
            }
        }));
    }
    {
        let (cfg, bus, reporter) = (Arc::clone(&cfg), bus.clone(), reporter.clone());
        handles.push(thread::spawn(move || {
            let mut t = TelemetryTask::new(&cfg, bus, reporter);
            for _ in 0..50 {
                assert!(t.run_cycle().is_some());
            }
        }));
    }
    {
        let (cfg, bus, reporter) = (Arc::clone(&cfg), bus.clone(), reporter.clone());
        handles.push(thread::spawn(move || {
            let mut m = MoldTask::new(&cfg, bus, reporter);
            for _ in 0..50 {
                assert!(m.run_cycle().is_some());
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(sent(&reporter).len(), 1 + 150);
}
