//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure. The engine ships one adapter family:
//!
//! - `persistence`: transactional in-memory gateway with optional
//!   JSON snapshot durability

pub mod persistence;
