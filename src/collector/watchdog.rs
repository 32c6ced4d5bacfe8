//! Node liveness watchdog.
//!
//! Each scan collects timed-out nodes under the registry lock, releases
//! it, then pushes one `node_lost` payload per node into the ingest queue.

use std::sync::Arc;

use log::{error, info, warn};

use super::queue::{IngestQueue, QueuedMessage};
use super::SharedRegistry;
use crate::app::messages::{self, NodeLost};

pub struct Watchdog {
    registry: Arc<SharedRegistry>,
    queue: Arc<IngestQueue>,
}

impl Watchdog {
    pub fn new(registry: Arc<SharedRegistry>, queue: Arc<IngestQueue>) -> Self {
        Self { registry, queue }
    }

    /// One scan at `now_ms`. Returns how many alerts were queued.
    pub fn scan(&self, now_ms: u64) -> usize {
        let lost = self.registry.with(|r| r.scan_timeouts(now_ms));

        let mut queued = 0;
        for event in &lost {
            let payload = match messages::to_json(&NodeLost::new(&event.label, &event.address)) {
                Ok(p) => p,
                Err(e) => {
                    error!("WATCHDOG | encode failed: {}", e);
                    continue;
                }
            };
            match self.queue.push(QueuedMessage::new(&event.address, &payload)) {
                Ok(()) => {
                    info!("WATCHDOG | timeout alert queued: {}", event.label);
                    queued += 1;
                }
                Err(_) => warn!("WATCHDOG | queue full, dropping timeout alert for {}", event.label),
            }
        }
        queued
    }
}
