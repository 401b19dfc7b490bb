//! # veil-storage
//!
//! The mapping store: one durable table from sealed canonical key to sealed
//! alias, append-only, safe to share between threads and processes.
//! SQLite in WAL mode with a serialized writer, a read pool, and
//! `BEGIN IMMEDIATE` test-and-set transactions. Plus an in-memory store for
//! tests and throwaway runs.

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod queries;
pub mod retry;
pub mod store;

pub use connection::DatabaseManager;
pub use memory::InMemoryMappingStore;
pub use retry::RetryPolicy;
pub use store::SqliteMappingStore;
