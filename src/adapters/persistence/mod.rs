//! Persistence Adapters - Gateway Implementations
//!
//! Implements the `PersistenceGateway` port. The in-memory gateway is
//! the reference implementation: staged-write transactions applied
//! atomically, with optional JSON snapshot durability via atomic file
//! writes. No database dependency; hosts needing one implement the
//! port against their own store.

pub mod memory;

pub use memory::InMemoryGateway;
