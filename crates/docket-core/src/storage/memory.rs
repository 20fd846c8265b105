use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::message::Message;
use crate::storage::traits::{
    FindOrder, MessageFilter, MessageMutation, NewMessage, StoreAdapter,
};

/// In-memory reference adapter. Not durable — intended for tests, local
/// development, and as the reference semantics for real backends.
///
/// A `BTreeMap` keyed by the v7 message id keeps documents in insertion
/// order, so `FindOrder::EnqueueOrder` is a front-to-back scan. The whole
/// conditional update runs under one mutex acquisition, which is the
/// atomicity the `StoreAdapter` contract demands.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<BTreeMap<Uuid, Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, BTreeMap<Uuid, Message>>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Backend("store mutex poisoned".to_string()))
    }
}

impl StoreAdapter for MemoryStore {
    fn ensure_indexes(&self) -> StorageResult<()> {
        // Iteration order comes from the BTreeMap and the token constraint
        // is enforced on write; nothing to provision.
        Ok(())
    }

    fn insert(&self, new: NewMessage) -> StorageResult<Uuid> {
        let mut docs = self.lock()?;
        let id = Uuid::now_v7();
        docs.insert(
            id,
            Message {
                id,
                payload: new.payload,
                visible_at: new.visible_at,
                lease_token: None,
                tries: 0,
                first_claimed_at: None,
                claimed_by: None,
                deleted_at: None,
            },
        );
        Ok(id)
    }

    fn find_one_and_update(
        &self,
        filter: &MessageFilter,
        mutation: &MessageMutation,
        _order: FindOrder,
    ) -> StorageResult<Option<Message>> {
        let mut docs = self.lock()?;

        // BTreeMap iteration is already id-ascending, so EnqueueOrder and
        // Any collapse to the same scan here.
        let Some(target_id) = docs.values().find(|m| filter.matches(m)).map(|m| m.id) else {
            return Ok(None);
        };

        // Unique constraint over lease tokens, sparse over absent values.
        if let Some(token) = mutation.lease_token {
            if docs
                .values()
                .any(|m| m.id != target_id && m.lease_token == Some(token))
            {
                return Err(StorageError::Constraint(format!(
                    "lease_token {token} already present"
                )));
            }
        }

        let msg = docs
            .get_mut(&target_id)
            .ok_or_else(|| StorageError::Backend("matched document vanished".to_string()))?;
        mutation.apply(msg);
        Ok(Some(msg.clone()))
    }

    fn delete_many(&self, filter: &MessageFilter) -> StorageResult<u64> {
        let mut docs = self.lock()?;
        let before = docs.len();
        docs.retain(|_, m| !filter.matches(m));
        Ok((before - docs.len()) as u64)
    }

    fn count(&self, filter: &MessageFilter) -> StorageResult<u64> {
        let docs = self.lock()?;
        Ok(docs.values().filter(|m| filter.matches(m)).count() as u64)
    }
}
