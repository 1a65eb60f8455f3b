//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - One parameterized statement per operation, `$n` placeholders only
//! - The pool is owned by the repository and closed on shutdown
//! - Mutations check affected rows instead of reporting blind success

pub mod pool;
pub mod repos;

pub use pool::{create_lazy_pool, create_pool};
pub use repos::*;
