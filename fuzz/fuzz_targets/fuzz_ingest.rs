//! Fuzz target: `Collector::receive`
//!
//! Splits arbitrary bytes into a source address and a payload, feeds them
//! through the ingest path and the watchdog, and asserts that nothing
//! panics and every queued message respects its fixed capacities.
//!
//! cargo fuzz run fuzz_ingest

#![no_main]

use libfuzzer_sys::fuzz_target;
use moldwatch::collector::queue::{ADDRESS_LEN, PAYLOAD_LEN};
use moldwatch::collector::registry::MAX_NODES;
use moldwatch::collector::watchdog::Watchdog;
use moldwatch::collector::Collector;
use moldwatch::config::CollectorConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let (address, payload) = text.split_once('\n').unwrap_or(("fd00::1", text));

    let collector = Collector::new(&CollectorConfig::default());
    let watchdog = Watchdog::new(collector.registry().clone(), collector.queue().clone());

    for (i, now) in [0u64, 10_000, 40_000].into_iter().enumerate() {
        let _ = collector.receive(address, payload, now);
        let _ = collector.receive(&format!("{address}{i}"), payload, now);
        watchdog.scan(now + 16_000);
    }

    assert!(collector.registry().with(|r| r.len()) <= MAX_NODES);
    while let Some(msg) = collector.queue().try_pop() {
        assert!(msg.payload.len() <= PAYLOAD_LEN);
        assert!(msg.source_address.len() <= ADDRESS_LEN);
    }
});
