use crate::error::Result;
use crate::storage::MessageFilter;
use crate::store::MessageStore;

/// Advisory aggregate counts over one queue's collection.
///
/// Each count is an independent read, so the four numbers are not a
/// consistent snapshot; they are meant for dashboards and tests, not for
/// control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub total: u64,
    pub pending: u64,
    pub in_flight: u64,
    pub done: u64,
}

impl MessageStore {
    /// All messages, regardless of state.
    pub fn total(&self) -> Result<u64> {
        Ok(self.adapter.count(&MessageFilter::default())?)
    }

    /// Messages currently claimable (same predicate `claim` uses).
    pub fn pending(&self) -> Result<u64> {
        let now = self.clock.now_ms();
        Ok(self.adapter.count(&MessageFilter {
            visible_at_most: Some(now),
            deleted: Some(false),
            ..MessageFilter::default()
        })?)
    }

    /// Messages held under a live lease.
    pub fn in_flight(&self) -> Result<u64> {
        let now = self.clock.now_ms();
        Ok(self.adapter.count(&MessageFilter {
            visible_after: Some(now),
            has_lease: Some(true),
            deleted: Some(false),
            ..MessageFilter::default()
        })?)
    }

    /// Messages acknowledged and awaiting purge.
    pub fn done(&self) -> Result<u64> {
        Ok(self.adapter.count(&MessageFilter {
            deleted: Some(true),
            ..MessageFilter::default()
        })?)
    }

    /// All four counts in one (non-atomic) pass.
    pub fn stats(&self) -> Result<QueueStats> {
        Ok(QueueStats {
            total: self.total()?,
            pending: self.pending()?,
            in_flight: self.in_flight()?,
            done: self.done()?,
        })
    }
}
