//! Reporter: JSON encoding plus the radio lock.
//!
//! Sends are fire-and-forget; the outcome is only logged. The radio lock
//! is taken after encoding and released straight after `send`, so it is
//! never held while waiting on the sensor bus.

use std::sync::Arc;

use log::{debug, error, warn};

use super::messages::{self, Classified, MessageType};
use super::ports::Transport;
use crate::sync::{self, Shared};

pub struct Reporter<T> {
    radio: Shared<T>,
}

impl<T> Clone for Reporter<T> {
    fn clone(&self) -> Self {
        Self {
            radio: Arc::clone(&self.radio),
        }
    }
}

impl<T: Transport> Reporter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            radio: sync::shared(transport),
        }
    }

    pub fn radio(&self) -> &Shared<T> {
        &self.radio
    }

    /// Encode and send `msg`. Returns whether the transport accepted it.
    pub fn report<M: Classified>(&self, msg: &M) -> bool {
        let payload = match messages::to_json(msg) {
            Ok(p) => p,
            Err(e) => {
                error!("REPORT | encode failed: {}", e);
                return false;
            }
        };

        let result = sync::lock_blocking(&self.radio).send(&payload);
        match result {
            Ok(()) => {
                match msg.message_type() {
                    MessageType::Alert => warn!("REPORT | ALERT sent: {}", payload),
                    MessageType::Data => debug!("REPORT | sent: {}", payload),
                }
                true
            }
            Err(e) => {
                warn!("REPORT | delivery failed: {}", e);
                false
            }
        }
    }
}
