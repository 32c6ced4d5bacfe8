//! Log-based output sink adapter.
//!
//! Implements [`OutputSink`] by writing every drained message to the
//! logger in the serial-bridge format (`[DATA]: <payload>`), which is what
//! the dashboard side parses. A future MQTT adapter would implement the
//! same trait.

use log::{debug, info};

use crate::app::ports::OutputSink;
use crate::collector::queue::QueuedMessage;

/// Adapter that logs every forwarded message to the console.
#[derive(Default)]
pub struct LogOutputSink {
    forwarded: u64,
}

impl LogOutputSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for LogOutputSink {
    fn emit(&mut self, message: &QueuedMessage) {
        self.forwarded += 1;
        debug!("BRIDGE | #{} from {}", self.forwarded, message.source_address);
        info!("[DATA]: {}", message.payload);
    }
}
