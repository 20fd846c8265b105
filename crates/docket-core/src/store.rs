use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::QueueConfig;
use crate::error::{QueueError, Result, StorageError};
use crate::message::Message;
use crate::metrics::Metrics;
use crate::storage::{FindOrder, MessageFilter, MessageMutation, NewMessage, StoreAdapter};

/// Per-claim options. Unset fields fall back to the queue configuration.
#[derive(Debug, Clone, Default)]
pub struct ClaimOptions {
    /// Lease duration override (ms).
    pub lease_ms: Option<u64>,
    /// Identity recorded on the message as the claimant.
    pub claimant: Option<String>,
}

/// A lease-based message queue over one document-store collection.
///
/// The store holds no mutable state of its own: every lifecycle transition
/// is a single atomic conditional update against the adapter, with a
/// predicate that re-checks the invariant justifying the transition. That
/// one atomicity boundary is the entire concurrency-safety argument — no
/// in-process locking, and any number of threads or processes may share a
/// queue through the same collection.
pub struct MessageStore {
    pub(crate) adapter: Arc<dyn StoreAdapter>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: QueueConfig,
    dead_letter: Option<Arc<MessageStore>>,
    metrics: Metrics,
}

impl MessageStore {
    pub fn new(adapter: Arc<dyn StoreAdapter>, config: QueueConfig) -> Self {
        Self::with_clock(adapter, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        adapter: Arc<dyn StoreAdapter>,
        config: QueueConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            adapter,
            clock,
            config,
            dead_letter: None,
            metrics: Metrics::new(),
        }
    }

    /// Attach a dead-letter target: a message claimed more than
    /// `config.max_retries` times is handed off to it instead of delivered.
    /// The target is itself a full `MessageStore`, so composition is
    /// recursive — a dead-letter queue can dead-letter in turn.
    pub fn with_dead_letter(mut self, dead_letter: Arc<MessageStore>) -> Self {
        self.dead_letter = Some(dead_letter);
        self
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Provision the backing collection (token uniqueness constraint,
    /// claim-order index). Idempotent; call once at startup.
    pub fn ensure_indexes(&self) -> Result<()> {
        self.adapter.ensure_indexes()?;
        Ok(())
    }

    /// Insert a message that becomes claimable after the queue's default
    /// delay. Returns the id the store assigned.
    pub fn enqueue<T: Serialize>(&self, payload: &T) -> Result<Uuid> {
        self.enqueue_delayed(payload, self.config.delay_ms)
    }

    /// Insert a message with an explicit delay before it becomes claimable.
    pub fn enqueue_delayed<T: Serialize>(&self, payload: &T, delay_ms: u64) -> Result<Uuid> {
        let payload = serde_json::to_value(payload).map_err(StorageError::from)?;
        let visible_at = self.clock.now_ms() + delay_ms;
        let id = self.adapter.insert(NewMessage {
            payload,
            visible_at,
        })?;
        self.metrics.record_enqueue(&self.config.name);
        debug!(queue = %self.config.name, msg_id = %id, delay_ms, "message enqueued");
        Ok(id)
    }

    /// Insert a batch of messages, returning the assigned ids in order.
    /// Inserts are sequential; the first failure propagates, and ids are
    /// store-assigned, so callers can tell which inserts landed.
    pub fn enqueue_many<T: Serialize>(&self, payloads: &[T]) -> Result<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(payloads.len());
        for payload in payloads {
            ids.push(self.enqueue(payload)?);
        }
        Ok(ids)
    }

    /// Claim the oldest claimable message under a fresh lease.
    ///
    /// `Ok(None)` means nothing is eligible right now — not an error; the
    /// caller polls or backs off. The returned message carries the lease
    /// token used for `renew` and `acknowledge`.
    pub fn claim(&self) -> Result<Option<Message>> {
        self.claim_with(ClaimOptions::default())
    }

    /// Claim with a per-call lease duration and/or claimant identity.
    ///
    /// One atomic conditional update selects the eligible message with the
    /// lowest id and, in the same step, issues the lease: fresh token,
    /// `visible_at` pushed to `now + lease`, `tries` incremented,
    /// `first_claimed_at` set on the first claim, `claimed_by` recorded if
    /// supplied. Eligibility is judged solely by `visible_at` and
    /// `deleted_at`; a stale token left by an expired lease never blocks a
    /// re-claim.
    ///
    /// With a dead-letter target attached, a claimed message whose `tries`
    /// exceeds `max_retries` is not delivered: it is enqueued on the target,
    /// acknowledged here with the token just issued, and the loop claims
    /// again. Each pass finalizes one exhausted message, so the loop is
    /// bounded by the backlog.
    pub fn claim_with(&self, opts: ClaimOptions) -> Result<Option<Message>> {
        let lease_ms = opts.lease_ms.unwrap_or(self.config.visibility_ms);
        loop {
            let now = self.clock.now_ms();
            let token = Uuid::new_v4();
            let filter = MessageFilter {
                visible_at_most: Some(now),
                deleted: Some(false),
                ..MessageFilter::default()
            };
            let mutation = MessageMutation {
                lease_token: Some(token),
                visible_at: Some(now + lease_ms),
                bump_tries: true,
                first_claimed_at: Some(now),
                claimed_by: opts.claimant.clone(),
                ..MessageMutation::default()
            };

            let Some(msg) =
                self.adapter
                    .find_one_and_update(&filter, &mutation, FindOrder::EnqueueOrder)?
            else {
                return Ok(None);
            };

            if let Some(ref dead_letter) = self.dead_letter {
                if msg.tries > self.config.max_retries {
                    dead_letter.enqueue(&msg)?;
                    self.acknowledge(token)?;
                    self.metrics.record_dead_letter(&self.config.name);
                    info!(
                        queue = %self.config.name,
                        msg_id = %msg.id,
                        tries = msg.tries,
                        dead_letter = %dead_letter.config.name,
                        "retry budget exhausted, message dead-lettered"
                    );
                    continue;
                }
            }

            self.metrics.record_claim(&self.config.name);
            debug!(queue = %self.config.name, msg_id = %msg.id, tries = msg.tries, "message claimed");
            return Ok(Some(msg));
        }
    }

    /// Extend a live lease by the queue's default visibility window.
    pub fn renew(&self, token: Uuid) -> Result<Uuid> {
        self.renew_for(token, self.config.visibility_ms)
    }

    /// Extend a live lease by `lease_ms`, returning the message id.
    ///
    /// Fails with `UnknownLease` when the token does not name a live lease —
    /// expired, never issued, or already acknowledged. In that case the
    /// message may already belong to another claimant and must not be
    /// touched; the predicate guarantees it is not.
    pub fn renew_for(&self, token: Uuid, lease_ms: u64) -> Result<Uuid> {
        let now = self.clock.now_ms();
        let mutation = MessageMutation {
            visible_at: Some(now + lease_ms),
            ..MessageMutation::default()
        };
        let msg = self
            .adapter
            .find_one_and_update(&Self::live_lease(token, now), &mutation, FindOrder::Any)?
            .ok_or(QueueError::UnknownLease(token))?;
        self.metrics.record_renew(&self.config.name);
        debug!(queue = %self.config.name, msg_id = %msg.id, visible_at = msg.visible_at, "lease renewed");
        Ok(msg.id)
    }

    /// Finalize the message held under `token`, returning its id.
    ///
    /// A second acknowledge with the same token fails with `UnknownLease`:
    /// the predicate excludes finalized messages, so the transition can only
    /// fire once per lease.
    pub fn acknowledge(&self, token: Uuid) -> Result<Uuid> {
        let now = self.clock.now_ms();
        let mutation = MessageMutation {
            deleted_at: Some(now),
            ..MessageMutation::default()
        };
        let msg = self
            .adapter
            .find_one_and_update(&Self::live_lease(token, now), &mutation, FindOrder::Any)?
            .ok_or(QueueError::UnknownLease(token))?;
        self.metrics.record_ack(&self.config.name);
        debug!(queue = %self.config.name, msg_id = %msg.id, "message acknowledged");
        Ok(msg.id)
    }

    /// Remove all finalized messages, returning how many were deleted.
    /// Not atomic with respect to concurrent readers; the counts are
    /// advisory anyway.
    pub fn purge_completed(&self) -> Result<u64> {
        let filter = MessageFilter {
            deleted: Some(true),
            ..MessageFilter::default()
        };
        let removed = self.adapter.delete_many(&filter)?;
        self.metrics.record_purge(&self.config.name, removed);
        debug!(queue = %self.config.name, removed, "completed messages purged");
        Ok(removed)
    }

    /// Predicate for "token names a live lease": token matches, deadline
    /// still ahead, not finalized. Renew and acknowledge both transition
    /// through it, which is what makes them safe against expired leases.
    fn live_lease(token: Uuid, now_ms: u64) -> MessageFilter {
        MessageFilter {
            lease_token: Some(token),
            visible_after: Some(now_ms),
            deleted: Some(false),
            ..MessageFilter::default()
        }
    }
}
