//! Core persistence and use-case logic for the parcel tracker.
//! This crate is the single source of truth for the `registered` guard.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelValidationError};
pub use repo::parcel_repo::{ParcelRepository, RepoError, RepoResult, SqliteParcelRepository};
pub use service::parcel_service::ParcelService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
