//! Infrastructure Layer - outbox storage

pub mod memory;
pub mod postgres;
