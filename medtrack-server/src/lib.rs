//! medtrack-server: HTTP API for the medical device tracker
//!
//! Exposes devices, their maintenance history and document references as a
//! JSON API under `/api`, plus a statistics snapshot for dashboards.
//! Persistence goes through the [`db::Store`] trait, backed by PostgreSQL
//! ([`db::PgStore`]) or an in-process store ([`db::MemoryStore`]).

pub mod db;
pub mod http;
pub mod models;

pub use db::{DbError, DbResult, MemoryStore, PgStore, Store};
pub use http::{build_router, run_server, AppState, ServerConfig, StatisticsSettings};
