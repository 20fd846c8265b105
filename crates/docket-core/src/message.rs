use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single queued work item — the sole persisted entity, one document per
/// message. Lifecycle state (pending / leased / done) is derived from field
/// presence and never stored separately, so claim eligibility is always
/// judged from the same fields the claim predicate checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Assigned by the store adapter at insertion. UUIDv7, so ids order by
    /// insertion time and claim can prefer the oldest eligible message.
    pub id: Uuid,
    /// Caller's work item.
    pub payload: serde_json::Value,
    /// Earliest instant (epoch ms) at which the message may be claimed.
    pub visible_at: u64,
    /// Present while a lease is outstanding; unique across live leases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_token: Option<Uuid>,
    /// Number of times this message has been claimed.
    #[serde(default)]
    pub tries: u32,
    /// Set on the first successful claim, never overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_claimed_at: Option<u64>,
    /// Caller-supplied identity of the current/last claimant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    /// Presence marks the message as acknowledged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<u64>,
}

impl Message {
    /// Acknowledged and awaiting purge.
    pub fn is_done(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Held under a still-live lease at `now_ms`.
    pub fn is_leased(&self, now_ms: u64) -> bool {
        !self.is_done() && self.lease_token.is_some() && self.visible_at > now_ms
    }

    /// Eligible for claim at `now_ms`. A stale token from an expired lease
    /// does not exclude a message: eligibility is judged solely by
    /// `visible_at` and `deleted_at`.
    pub fn is_claimable(&self, now_ms: u64) -> bool {
        !self.is_done() && self.visible_at <= now_ms
    }
}
