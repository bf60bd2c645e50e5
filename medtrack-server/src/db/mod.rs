//! Database layer - connection pool, schema and stores
//!
//! # Design Principles
//!
//! - Handlers only see the [`Store`] trait object
//! - Rely on DB constraints (unique serial, FK, cascade) and map violations
//! - Transactions for multi-step operations (cascade delete, statistics)

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use postgres::PgStore;
pub use repository::*;
