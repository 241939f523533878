//! Parcel domain model.
//!
//! # Responsibility
//! - Define the shipment record persisted in the `parcel` table.
//! - Own the lifecycle ordering and the `registered` guard predicate.
//!
//! # Invariants
//! - `number` is assigned by storage; unsaved parcels carry `0`.
//! - `created_at` is an RFC3339 UTC timestamp and is never rewritten.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Storage-assigned parcel identifier.
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel.
pub type ClientId = i64;

/// Shipment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted but not yet handed to a carrier.
    Registered,
    /// In transit.
    Sent,
    /// Handed to the recipient.
    Delivered,
}

impl ParcelStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Parses the storage representation. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "registered" => Some(Self::Registered),
            "sent" => Some(Self::Sent),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Returns the following lifecycle step, or `None` for the final one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Whether address edits and deletion are allowed in this state.
    pub fn is_mutable(self) -> bool {
        self == Self::Registered
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors raised before a parcel is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParcelValidationError {
    #[error("parcel created_at `{0}` is not an RFC3339 timestamp")]
    InvalidCreatedAt(String),
}

/// One shipment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    pub address: String,
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved `registered` parcel stamped with the current UTC time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Checks structural invariants shared by write and read paths.
    ///
    /// `address` is free text; any string, including an empty one, is kept.
    pub fn validate(&self) -> Result<(), ParcelValidationError> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|_| ParcelValidationError::InvalidCreatedAt(self.created_at.clone()))?;
        Ok(())
    }
}
