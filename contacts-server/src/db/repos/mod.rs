//! Repository implementations for contact storage
//!
//! Handlers talk to a `ContactStore`; the PostgreSQL repository is the
//! production backend and the in-memory one serves local runs and tests.

pub mod contacts;
pub mod memory;

use async_trait::async_trait;

use crate::models::{Contact, NewContact};

pub use contacts::ContactRepo;
pub use memory::MemoryContactRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("corrupt {resource} row '{id}': {reason}")]
    Corrupt {
        resource: &'static str,
        id: String,
        reason: String,
    },

    #[error("{resource} id space exhausted")]
    IdsExhausted { resource: &'static str },
}

impl DbError {
    pub(crate) fn contact_not_found(id: i32) -> Self {
        Self::NotFound {
            resource: "contact",
            id: id.to_string(),
        }
    }
}

/// Storage operations behind the contacts routes.
///
/// Each mutation runs exactly once; nothing here retries.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Short backend name for health output and logs.
    fn backend(&self) -> &'static str;

    /// Every stored contact, in store order.
    async fn list(&self) -> Result<Vec<Contact>, DbError>;

    /// Insert and return the generated id.
    async fn create(&self, contact: NewContact) -> Result<i32, DbError>;

    /// `DbError::NotFound` when no row has `id`.
    async fn get(&self, id: i32) -> Result<Contact, DbError>;

    /// Full replace. `DbError::NotFound` when no row was affected.
    async fn update(&self, id: i32, contact: NewContact) -> Result<(), DbError>;

    /// `DbError::NotFound` when no row was affected.
    async fn delete(&self, id: i32) -> Result<(), DbError>;

    /// Release backend resources once the server has drained.
    async fn close(&self) {}
}
