//! Domain model for tracked parcel shipments.
//!
//! # Invariants
//! - A parcel's `number` and `client` never change after insertion.
//! - Address edits and deletion are only legal while `registered`.

pub mod parcel;
