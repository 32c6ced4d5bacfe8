//! In-process mesh transport.
//!
//! Delivers every payload straight into a [`Collector`] under a fixed
//! source address, standing in for the radio link in the host simulator.
//! The link can be cut to make a node go silent.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use heapless::String;
use log::debug;

use crate::app::ports::{Clock, Transport};
use crate::collector::queue::ADDRESS_LEN;
use crate::collector::Collector;
use crate::config::truncated;
use crate::error::TransportError;

pub struct LoopbackTransport<C> {
    address: String<ADDRESS_LEN>,
    collector: Arc<Collector>,
    clock: C,
    link_up: Arc<AtomicBool>,
}

impl<C: Clock> LoopbackTransport<C> {
    pub fn new(address: &str, collector: Arc<Collector>, clock: C) -> Self {
        Self {
            address: truncated(address),
            collector,
            clock,
            link_up: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle for cutting or restoring the link from another thread.
    pub fn link(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.link_up)
    }
}

impl<C: Clock> Transport for LoopbackTransport<C> {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        if !self.link_up.load(Ordering::Relaxed) {
            return Err(TransportError::Unreachable);
        }
        // Collector-side drops are not visible to the sender.
        if let Err(e) = self
            .collector
            .receive(&self.address, payload, self.clock.now_ms())
        {
            debug!("LOOPBACK | collector dropped message from {}: {}", self.address, e);
        }
        Ok(())
    }
}
