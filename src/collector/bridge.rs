//! Output bridge: the single consumer of the ingest queue.

use log::info;

use super::queue::IngestQueue;
use crate::app::ports::OutputSink;

pub struct Bridge<'a, S> {
    queue: &'a IngestQueue,
    sink: S,
}

impl<'a, S: OutputSink> Bridge<'a, S> {
    pub fn new(queue: &'a IngestQueue, sink: S) -> Self {
        Self { queue, sink }
    }

    /// Wait for the next message and forward it.
    pub fn forward_one(&mut self) {
        let msg = self.queue.pop();
        self.sink.emit(&msg);
    }

    /// Forward everything currently queued without waiting. Returns the count.
    pub fn drain(&mut self) -> usize {
        let mut n = 0;
        while let Some(msg) = self.queue.try_pop() {
            self.sink.emit(&msg);
            n += 1;
        }
        n
    }

    /// Consume until `running` returns false (checked between messages).
    pub fn run(&mut self, mut running: impl FnMut() -> bool) {
        info!("--- Serial Bridge Started ---");
        while running() {
            self.forward_one();
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
