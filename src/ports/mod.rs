//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PersistenceGateway`: transactional durable storage for markets,
//!   users, positions, and the trade log

pub mod gateway;

pub use gateway::PersistenceGateway;
