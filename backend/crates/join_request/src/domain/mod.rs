//! Domain Layer
//!
//! Join-request entities and the membership outbox port.

pub mod entity;
pub mod repository;
