#![allow(dead_code)]

use std::sync::Arc;

use docket_core::{ManualClock, MemoryStore, MessageStore, QueueConfig};

/// Fixed test epoch (ms) so deadline arithmetic in assertions stays legible.
pub const EPOCH: u64 = 1_700_000_000_000;

/// Queue over a fresh in-memory store with a manually driven clock, so
/// scenarios can cross visibility windows without sleeping.
pub fn manual_queue(name: &str, visibility_ms: u64) -> (MessageStore, Arc<ManualClock>) {
    docket_core::telemetry::init_tracing();
    let clock = Arc::new(ManualClock::new(EPOCH));
    let mut config = QueueConfig::new(name);
    config.visibility_ms = visibility_ms;
    let queue = MessageStore::with_clock(Arc::new(MemoryStore::new()), config, clock.clone());
    queue.ensure_indexes().expect("provision in-memory store");
    (queue, clock)
}

/// Queue on the system clock, for concurrency scenarios where real threads
/// race real claims. The default 30s visibility keeps leases alive for the
/// duration of any test run.
pub fn system_queue(name: &str) -> MessageStore {
    docket_core::telemetry::init_tracing();
    let queue = MessageStore::new(Arc::new(MemoryStore::new()), QueueConfig::new(name));
    queue.ensure_indexes().expect("provision in-memory store");
    queue
}

/// A main queue wired to a dead-letter queue, both on the same manual clock.
pub fn dead_letter_pair(
    max_retries: u32,
    visibility_ms: u64,
) -> (MessageStore, Arc<MessageStore>, Arc<ManualClock>) {
    docket_core::telemetry::init_tracing();
    let clock = Arc::new(ManualClock::new(EPOCH));
    let dead_letter = Arc::new(MessageStore::with_clock(
        Arc::new(MemoryStore::new()),
        QueueConfig::new("orders.dlq"),
        clock.clone(),
    ));

    let mut config = QueueConfig::new("orders");
    config.visibility_ms = visibility_ms;
    config.max_retries = max_retries;
    let main = MessageStore::with_clock(Arc::new(MemoryStore::new()), config, clock.clone())
        .with_dead_letter(dead_letter.clone());
    main.ensure_indexes().expect("provision in-memory store");

    (main, dead_letter, clock)
}
