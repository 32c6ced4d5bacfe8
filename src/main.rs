//! MoldWatch host mesh simulator.
//!
//! ```text
//! ┌───────────── node "Bathroom" ─────────────┐
//! │ HealthTask · TelemetryTask · MoldTask      │──┐
//! └────────────────────────────────────────────┘  │  LoopbackTransport
//! ┌───────────── node "Basement" ─────────────┐  ├──────────────────▶ Collector
//! │ HealthTask · TelemetryTask · MoldTask      │──┘        │
//! └────────────────────────────────────────────┘           ├─ Watchdog thread
//!                                                          └─ Bridge thread ─▶ [DATA]: …
//! ```
//!
//! Both nodes read the simulated weather pattern. The second node's link
//! is cut after a number of reports so the watchdog fires.
//!
//! Environment:
//! - `RUST_LOG` (default `info`)
//! - `MOLDWATCH_SPEEDUP`: time acceleration factor (default 60)
//! - `MOLDWATCH_SILENCE_AFTER`: reports before node 2 goes silent (default 12)
//! - `MOLDWATCH_RUNTIME_SECS`: stop after this many real seconds (default: run forever)

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use moldwatch::adapters::log_sink::LogOutputSink;
use moldwatch::adapters::loopback::LoopbackTransport;
use moldwatch::adapters::time::MonotonicClock;
use moldwatch::app::ports::{Clock, Transport};
use moldwatch::app::reporter::Reporter;
use moldwatch::app::tasks::{HealthTask, MoldTask, TelemetryTask};
use moldwatch::collector::bridge::Bridge;
use moldwatch::collector::watchdog::Watchdog;
use moldwatch::collector::Collector;
use moldwatch::config::{CollectorConfig, NodeConfig};
use moldwatch::error::TransportError;
use moldwatch::model::MaterialClass;
use moldwatch::sensors::simulated::SimulatedWeather;
use moldwatch::sensors::SensorBus;

// ── Simulation clock ──────────────────────────────────────────

/// Monotonic clock running `speedup` times faster than real time.
struct ScaledClock {
    inner: MonotonicClock,
    speedup: u64,
}

impl Clock for ScaledClock {
    fn now_ms(&self) -> u64 {
        self.inner.now_ms().saturating_mul(self.speedup)
    }
}

// ── Silent-node transport ─────────────────────────────────────

/// Cuts its loopback link after `remaining` successful sends.
struct FlakyLink<C: Clock> {
    inner: LoopbackTransport<C>,
    remaining: Option<u32>,
}

impl<C: Clock> Transport for FlakyLink<C> {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        if let Some(n) = self.remaining.as_mut() {
            if *n == 0 {
                self.inner.link().store(false, Ordering::Relaxed);
                warn!("SIM | link cut, node goes silent");
                self.remaining = None;
            } else {
                *n -= 1;
            }
        }
        self.inner.send(payload)
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(v) => v
            .parse()
            .with_context(|| format!("{name} must be an unsigned integer, got {v:?}")),
        Err(_) => Ok(default),
    }
}

/// Run `cycle` every `period` of simulated time on its own thread.
fn spawn_periodic(
    name: &str,
    period_secs: u32,
    speedup: u64,
    running: Arc<AtomicBool>,
    mut cycle: impl FnMut() + Send + 'static,
) -> Result<()> {
    let period = Duration::from_millis(u64::from(period_secs) * 1000 / speedup.max(1));
    thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            while running.load(Ordering::Relaxed) {
                cycle();
                thread::sleep(period);
            }
        })
        .with_context(|| format!("spawning {name}"))?;
    Ok(())
}

fn spawn_node(
    config: NodeConfig,
    address: &str,
    silence_after: Option<u32>,
    collector: &Arc<Collector>,
    clock: &Arc<ScaledClock>,
    speedup: u64,
    running: &Arc<AtomicBool>,
) -> Result<()> {
    config.validate().context("node config")?;

    let bus = SensorBus::new(SimulatedWeather::new(Arc::clone(clock))).into_shared();
    let link = FlakyLink {
        inner: LoopbackTransport::new(address, Arc::clone(collector), Arc::clone(clock)),
        remaining: silence_after,
    };
    let reporter = Reporter::new(link);

    let mut health = HealthTask::new(&config, bus.clone(), reporter.clone());
    let mut telemetry = TelemetryTask::new(&config, bus.clone(), reporter.clone());
    let mut mold = MoldTask::new(&config, bus, reporter);

    let room = config.room_name.as_str();
    spawn_periodic(
        &format!("{room}-health"),
        config.health_period_secs,
        speedup,
        Arc::clone(running),
        move || {
            health.run_cycle();
        },
    )?;
    spawn_periodic(
        &format!("{room}-telemetry"),
        config.telemetry_period_secs,
        speedup,
        Arc::clone(running),
        move || {
            telemetry.run_cycle();
        },
    )?;
    spawn_periodic(
        &format!("{room}-vtt"),
        config.model_period_secs,
        speedup,
        Arc::clone(running),
        move || {
            mold.run_cycle();
        },
    )?;

    info!("SIM | node '{}' up at {}", room, address);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  MoldWatch mesh simulator v{}     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let speedup = env_u64("MOLDWATCH_SPEEDUP", 60)?.max(1);
    let silence_after = u32::try_from(env_u64("MOLDWATCH_SILENCE_AFTER", 12)?)
        .context("MOLDWATCH_SILENCE_AFTER out of range")?;
    let runtime_secs = env_u64("MOLDWATCH_RUNTIME_SECS", 0)?;

    let clock = Arc::new(ScaledClock {
        inner: MonotonicClock::new(),
        speedup,
    });
    let running = Arc::new(AtomicBool::new(true));

    // ── 1. Collector ──────────────────────────────────────────
    let collector_cfg = CollectorConfig::default();
    collector_cfg.validate().context("collector config")?;
    let collector = Arc::new(Collector::new(&collector_cfg));

    let bridge_queue = Arc::clone(collector.queue());
    let bridge = thread::Builder::new()
        .name("bridge".into())
        .spawn(move || Bridge::new(&bridge_queue, LogOutputSink::new()).run(|| true))
        .context("spawning bridge")?;

    let watchdog = Watchdog::new(Arc::clone(collector.registry()), Arc::clone(collector.queue()));
    {
        let clock = Arc::clone(&clock);
        let period_secs = (collector_cfg.watchdog_period_ms / 1000).max(1) as u32;
        spawn_periodic("watchdog", period_secs, speedup, Arc::clone(&running), move || {
            watchdog.scan(clock.now_ms());
        })?;
    }

    // ── 2. Sensor nodes ───────────────────────────────────────
    spawn_node(
        NodeConfig::with_room("Bathroom"),
        "fd00::1",
        None,
        &collector,
        &clock,
        speedup,
        &running,
    )?;

    let mut basement = NodeConfig::with_room("Basement");
    basement.material = MaterialClass::MediumResistant;
    spawn_node(
        basement,
        "fd00::2",
        Some(silence_after),
        &collector,
        &clock,
        speedup,
        &running,
    )?;

    info!("SIM | running (speedup x{})", speedup);

    // ── 3. Lifetime ───────────────────────────────────────────
    if runtime_secs == 0 {
        bridge
            .join()
            .map_err(|_| anyhow::anyhow!("bridge thread panicked"))?;
        return Ok(());
    }

    thread::sleep(Duration::from_secs(runtime_secs));
    running.store(false, Ordering::Relaxed);
    let online = collector.registry().with(|r| r.online_count());
    info!(
        "SIM | done: online={} dropped={} registry_full={}",
        online,
        collector.dropped_count(),
        collector.registry_full_count()
    );
    Ok(())
}
