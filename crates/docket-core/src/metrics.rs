use opentelemetry::metrics::{Counter, Meter};
use opentelemetry::KeyValue;

/// OTel instruments for queue operations. Created once per `MessageStore`
/// and recorded on every lifecycle transition. If no meter provider is
/// configured (OTel disabled), the instruments are no-op.
pub struct Metrics {
    messages_enqueued: Counter<u64>,
    messages_claimed: Counter<u64>,
    messages_renewed: Counter<u64>,
    messages_acked: Counter<u64>,
    messages_dead_lettered: Counter<u64>,
    messages_purged: Counter<u64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create metrics from the global meter provider.
    pub fn new() -> Self {
        let meter = opentelemetry::global::meter("docket");
        Self::from_meter(&meter)
    }

    /// Create metrics from a specific meter (tests use an in-memory exporter).
    pub fn from_meter(meter: &Meter) -> Self {
        Self {
            messages_enqueued: meter
                .u64_counter("docket.messages.enqueued")
                .with_description("Total messages enqueued")
                .build(),
            messages_claimed: meter
                .u64_counter("docket.messages.claimed")
                .with_description("Total leases issued to claimants")
                .build(),
            messages_renewed: meter
                .u64_counter("docket.messages.renewed")
                .with_description("Total lease renewals")
                .build(),
            messages_acked: meter
                .u64_counter("docket.messages.acked")
                .with_description("Total messages acknowledged")
                .build(),
            messages_dead_lettered: meter
                .u64_counter("docket.messages.dead_lettered")
                .with_description("Total messages handed to a dead-letter queue")
                .build(),
            messages_purged: meter
                .u64_counter("docket.messages.purged")
                .with_description("Total finalized messages purged")
                .build(),
        }
    }

    pub fn record_enqueue(&self, queue: &str) {
        self.messages_enqueued
            .add(1, &[KeyValue::new("queue", queue.to_string())]);
    }

    pub fn record_claim(&self, queue: &str) {
        self.messages_claimed
            .add(1, &[KeyValue::new("queue", queue.to_string())]);
    }

    pub fn record_renew(&self, queue: &str) {
        self.messages_renewed
            .add(1, &[KeyValue::new("queue", queue.to_string())]);
    }

    pub fn record_ack(&self, queue: &str) {
        self.messages_acked
            .add(1, &[KeyValue::new("queue", queue.to_string())]);
    }

    pub fn record_dead_letter(&self, queue: &str) {
        self.messages_dead_lettered
            .add(1, &[KeyValue::new("queue", queue.to_string())]);
    }

    pub fn record_purge(&self, queue: &str, removed: u64) {
        self.messages_purged
            .add(removed, &[KeyValue::new("queue", queue.to_string())]);
    }
}
