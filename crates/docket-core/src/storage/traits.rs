use uuid::Uuid;

use crate::error::StorageResult;
use crate::message::Message;

/// A not-yet-inserted message. The store assigns the id at insertion.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub payload: serde_json::Value,
    pub visible_at: u64,
}

/// Declarative predicate over message fields. Every condition is optional;
/// an empty filter matches everything. Adapters translate this to their
/// native query language; `matches` is the reference evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageFilter {
    /// `visible_at <= t` — the claim-eligibility side of a deadline.
    pub visible_at_most: Option<u64>,
    /// `visible_at > t` — the live-lease side of a deadline.
    pub visible_after: Option<u64>,
    /// Exact lease token match.
    pub lease_token: Option<Uuid>,
    /// Presence (true) or absence (false) of any lease token.
    pub has_lease: Option<bool>,
    /// Presence (true) or absence (false) of `deleted_at`.
    pub deleted: Option<bool>,
}

impl MessageFilter {
    pub fn matches(&self, msg: &Message) -> bool {
        if let Some(t) = self.visible_at_most {
            if msg.visible_at > t {
                return false;
            }
        }
        if let Some(t) = self.visible_after {
            if msg.visible_at <= t {
                return false;
            }
        }
        if let Some(token) = self.lease_token {
            if msg.lease_token != Some(token) {
                return false;
            }
        }
        if let Some(has) = self.has_lease {
            if msg.lease_token.is_some() != has {
                return false;
            }
        }
        if let Some(deleted) = self.deleted {
            if msg.deleted_at.is_some() != deleted {
                return false;
            }
        }
        true
    }
}

/// Declarative mutation applied to the matched message. Unset fields leave
/// the document untouched.
#[derive(Debug, Clone, Default)]
pub struct MessageMutation {
    pub lease_token: Option<Uuid>,
    pub visible_at: Option<u64>,
    /// Increment `tries` by one.
    pub bump_tries: bool,
    /// Set `first_claimed_at` — applied only when currently unset.
    pub first_claimed_at: Option<u64>,
    pub claimed_by: Option<String>,
    pub deleted_at: Option<u64>,
}

impl MessageMutation {
    pub fn apply(&self, msg: &mut Message) {
        if let Some(token) = self.lease_token {
            msg.lease_token = Some(token);
        }
        if let Some(t) = self.visible_at {
            msg.visible_at = t;
        }
        if self.bump_tries {
            msg.tries += 1;
        }
        if let Some(t) = self.first_claimed_at {
            if msg.first_claimed_at.is_none() {
                msg.first_claimed_at = Some(t);
            }
        }
        if let Some(ref claimant) = self.claimed_by {
            msg.claimed_by = Some(claimant.clone());
        }
        if let Some(t) = self.deleted_at {
            msg.deleted_at = Some(t);
        }
    }
}

/// Which matching document `find_one_and_update` should pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOrder {
    /// Lowest id first — approximate enqueue order for v7 ids.
    EnqueueOrder,
    /// Any match; used when the filter can match at most one document.
    Any,
}

/// The document store contract the queue is built on. Implementations must
/// be thread-safe.
///
/// `find_one_and_update` is the synchronization primitive for the whole
/// queue: matching and mutating must happen as one isolated step, with no
/// reader ever observing a half-applied mutation and no two concurrent
/// callers both matching the same document in the same state.
pub trait StoreAdapter: Send + Sync {
    /// Provision whatever the backend needs for the lease-token uniqueness
    /// constraint (sparse over absent values) and for efficient
    /// `(deleted_at-absence, visible_at, id)` lookup. Idempotent.
    fn ensure_indexes(&self) -> StorageResult<()>;

    /// Insert a new message and return the id the store assigned to it.
    fn insert(&self, new: NewMessage) -> StorageResult<Uuid>;

    /// Atomically find one message matching `filter`, apply `mutation`, and
    /// return the post-mutation document. `Ok(None)` when nothing matches.
    fn find_one_and_update(
        &self,
        filter: &MessageFilter,
        mutation: &MessageMutation,
        order: FindOrder,
    ) -> StorageResult<Option<Message>>;

    /// Delete all messages matching `filter`, returning how many were removed.
    fn delete_many(&self, filter: &MessageFilter) -> StorageResult<u64>;

    /// Count messages matching `filter`.
    fn count(&self, filter: &MessageFilter) -> StorageResult<u64>;
}
