//! Collector node: registry, watchdog and the ingest path.
//!
//! ```text
//!  network ─▶ Collector::receive ─┬─▶ NodeRegistry.update   (registry lock)
//!                                 └─▶ IngestQueue.push ─▶ Bridge ─▶ OutputSink
//!  timer   ─▶ Watchdog::scan ─▶ NodeRegistry.scan_timeouts ─▶ IngestQueue.push
//! ```
//!
//! The registry lock is table-wide and never held across a queue push.

pub mod bridge;
pub mod queue;
pub mod registry;
pub mod watchdog;

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use log::{debug, warn};
use serde::Deserialize;

use crate::config::CollectorConfig;
use crate::error::Result;
use queue::{IngestQueue, QueuedMessage};
use registry::{NodeRegistry, UpdateOutcome};

/// Label used when a payload carries no room name.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Registry behind one table-wide lock.
pub struct SharedRegistry(Mutex<CriticalSectionRawMutex, RefCell<NodeRegistry>>);

impl SharedRegistry {
    pub fn new(registry: NodeRegistry) -> Self {
        Self(Mutex::new(RefCell::new(registry)))
    }

    /// Run `f` with exclusive access to the table.
    pub fn with<R>(&self, f: impl FnOnce(&mut NodeRegistry) -> R) -> R {
        self.0.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Fields used to label a node; everything else is ignored.
#[derive(Deserialize)]
struct LabelFields<'a> {
    #[serde(borrow, default)]
    room_name: Option<&'a str>,
    #[serde(borrow, default)]
    room: Option<&'a str>,
}

/// Extract the room label from a node payload.
pub fn extract_label(payload: &str) -> &str {
    match serde_json::from_str::<LabelFields<'_>>(payload) {
        Ok(f) => f.room_name.or(f.room).unwrap_or(UNKNOWN_LABEL),
        Err(e) => {
            debug!("INGEST | no label in payload: {}", e);
            UNKNOWN_LABEL
        }
    }
}

/// Receive side of the collector.
pub struct Collector {
    registry: Arc<SharedRegistry>,
    queue: Arc<IngestQueue>,
    registry_full: AtomicU32,
}

impl Collector {
    pub fn new(config: &CollectorConfig) -> Self {
        Self::with_parts(
            Arc::new(SharedRegistry::new(NodeRegistry::new(config.node_timeout_ms))),
            Arc::new(IngestQueue::new()),
        )
    }

    pub fn with_parts(registry: Arc<SharedRegistry>, queue: Arc<IngestQueue>) -> Self {
        Self {
            registry,
            queue,
            registry_full: AtomicU32::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<SharedRegistry> {
        &self.registry
    }

    pub fn queue(&self) -> &Arc<IngestQueue> {
        &self.queue
    }

    /// Handle one inbound payload from `source_address`.
    ///
    /// A full registry does not stop the message from being forwarded.
    pub fn receive(&self, source_address: &str, payload: &str, now_ms: u64) -> Result<UpdateOutcome> {
        let label = extract_label(payload);
        let outcome = self
            .registry
            .with(|r| r.update(source_address, label, now_ms));
        if outcome.is_err() {
            self.registry_full.fetch_add(1, Ordering::Relaxed);
        }

        let msg = QueuedMessage::new(source_address, payload);
        if let Err(e) = self.queue.push(msg) {
            warn!("INGEST | queue full, dropping packet from {}", source_address);
            return Err(e.into());
        }
        Ok(outcome?)
    }

    /// Inserts rejected because every registry slot was taken.
    pub fn registry_full_count(&self) -> u32 {
        self.registry_full.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u32 {
        self.queue.dropped()
    }
}
