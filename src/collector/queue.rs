//! Ingest queue between network reception and the output bridge.
//!
//! Uses an `embassy-sync` bounded channel so producers on any thread can
//! push without blocking, while the single consumer parks on `pop`.
//!
//! ```text
//! ┌──────────────┐  QueuedMessage  ┌──────────────┐
//! │  Receiver /  │───────────────▶│    Bridge     │
//! │  Watchdog    │   (drop-on-full) │  (consumer)   │
//! └──────────────┘                 └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;
use log::warn;

use crate::config::truncated;
use crate::error::QueueFull;

pub const PAYLOAD_LEN: usize = 256;
pub const ADDRESS_LEN: usize = 64;

/// Channel depth.
pub const QUEUE_DEPTH: usize = 10;

/// One inbound (or synthesized) message. Fixed size, no heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub payload: String<PAYLOAD_LEN>,
    pub source_address: String<ADDRESS_LEN>,
}

impl QueuedMessage {
    /// Oversized inputs are cut at a UTF-8 boundary.
    pub fn new(source_address: &str, payload: &str) -> Self {
        if payload.len() > PAYLOAD_LEN {
            warn!(
                "INGEST | payload from {} truncated ({} > {} bytes)",
                source_address,
                payload.len(),
                PAYLOAD_LEN
            );
        }
        Self {
            payload: truncated(payload),
            source_address: truncated(source_address),
        }
    }
}

pub struct IngestQueue {
    channel: Channel<CriticalSectionRawMutex, QueuedMessage, QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl Default for IngestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue without blocking. A full queue drops `msg`.
    pub fn push(&self, msg: QueuedMessage) -> Result<(), QueueFull> {
        self.channel.try_send(msg).map_err(|_| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            QueueFull
        })
    }

    /// Block until a message is available.
    pub fn pop(&self) -> QueuedMessage {
        futures_lite::future::block_on(self.channel.receive())
    }

    pub fn try_pop(&self) -> Option<QueuedMessage> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Messages rejected because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}
