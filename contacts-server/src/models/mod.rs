//! Domain models with validation at construction
//!
//! Request bodies arrive as a loose `ContactDraft` and are validated into a
//! `NewContact` before any statement reaches the store.

pub mod contact;
pub mod validation;

pub use contact::{Contact, ContactDraft, ContactType, NewContact};
pub use validation::ValidationError;
