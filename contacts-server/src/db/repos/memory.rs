//! In-process contact store
//!
//! Same contract as the PostgreSQL repository. Ids come from a counter that
//! never goes backwards, so a deleted id is never handed out again.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ContactStore, DbError};
use crate::models::{Contact, NewContact};

#[derive(Debug)]
struct Inner {
    next_id: i32,
    rows: BTreeMap<i32, Contact>,
}

/// Contacts held in memory for the lifetime of the process
#[derive(Debug)]
pub struct MemoryContactRepo {
    inner: RwLock<Inner>,
}

impl MemoryContactRepo {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryContactRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactStore for MemoryContactRepo {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Contact>, DbError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn create(&self, contact: NewContact) -> Result<i32, DbError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id = id
            .checked_add(1)
            .ok_or(DbError::IdsExhausted { resource: "contact" })?;
        inner.rows.insert(id, contact.into_contact(id));
        Ok(id)
    }

    async fn get(&self, id: i32) -> Result<Contact, DbError> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::contact_not_found(id))
    }

    async fn update(&self, id: i32, contact: NewContact) -> Result<(), DbError> {
        let mut inner = self.inner.write().await;
        match inner.rows.get_mut(&id) {
            Some(slot) => {
                *slot = contact.into_contact(id);
                Ok(())
            }
            None => Err(DbError::contact_not_found(id)),
        }
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        self.inner
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::contact_not_found(id))
    }
}
