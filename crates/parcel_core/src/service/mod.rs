//! Use-case services orchestrating repository calls.
//!
//! # Invariants
//! - Services stay storage-agnostic and depend only on repository traits.

pub mod parcel_service;
