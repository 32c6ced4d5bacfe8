//! Node registry: which sensor nodes the collector has heard from.
//!
//! Fixed capacity, keyed by source address. Records are only ever added
//! or refreshed, never evicted; a node that goes silent stays in its slot
//! with `is_online = false` until it reports again.

use heapless::{LinearMap, String, Vec};
use log::{info, warn};

use super::queue::ADDRESS_LEN;
use crate::config::{truncated, ROOM_NAME_LEN};
use crate::error::RegistryError;

pub const MAX_NODES: usize = 10;

/// Default silence (ms) before a node is declared lost.
pub const NODE_TIMEOUT_MS: u64 = 15_000;

pub type Address = String<ADDRESS_LEN>;
pub type Label = String<ROOM_NAME_LEN>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub label: Label,
    /// Monotonic milliseconds of the last inbound message.
    pub last_seen_ms: u64,
    pub is_online: bool,
}

/// What [`NodeRegistry::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Registered,
    Refreshed,
    Reconnected,
}

/// Emitted once when an online node exceeds the timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLostEvent {
    pub label: Label,
    pub address: Address,
}

pub struct NodeRegistry {
    nodes: LinearMap<Address, NodeRecord, MAX_NODES>,
    timeout_ms: u64,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new(NODE_TIMEOUT_MS)
    }
}

impl NodeRegistry {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            nodes: LinearMap::new(),
            timeout_ms,
        }
    }

    /// Record an inbound message from `address`.
    pub fn update(&mut self, address: &str, label: &str, now_ms: u64) -> Result<UpdateOutcome, RegistryError> {
        let key: Address = truncated(address);

        if let Some(rec) = self.nodes.get_mut(&key) {
            rec.label = truncated(label);
            rec.last_seen_ms = now_ms;
            if rec.is_online {
                return Ok(UpdateOutcome::Refreshed);
            }
            rec.is_online = true;
            info!("REGISTRY | node reconnected: {} ({})", key, rec.label);
            return Ok(UpdateOutcome::Reconnected);
        }

        let rec = NodeRecord {
            label: truncated(label),
            last_seen_ms: now_ms,
            is_online: true,
        };
        if self.nodes.insert(key, rec).is_err() {
            warn!("REGISTRY | full, cannot track new node {}", address);
            return Err(RegistryError::Full);
        }
        info!("REGISTRY | new node registered: {} ({})", address, label);
        Ok(UpdateOutcome::Registered)
    }

    /// Flip every timed-out online node offline, one event per node.
    pub fn scan_timeouts(&mut self, now_ms: u64) -> Vec<NodeLostEvent, MAX_NODES> {
        let mut lost = Vec::new();
        for (address, rec) in self.nodes.iter_mut() {
            if !rec.is_online || now_ms.saturating_sub(rec.last_seen_ms) <= self.timeout_ms {
                continue;
            }
            rec.is_online = false;
            warn!("REGISTRY | node lost: {} ({})", address, rec.label);
            // Capacity matches the table, so this cannot overflow.
            let _ = lost.push(NodeLostEvent {
                label: rec.label.clone(),
                address: address.clone(),
            });
        }
        lost
    }

    pub fn get(&self, address: &str) -> Option<&NodeRecord> {
        self.nodes.get(&truncated::<ADDRESS_LEN>(address))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &NodeRecord)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn online_count(&self) -> usize {
        self.nodes.values().filter(|r| r.is_online).count()
    }
}
