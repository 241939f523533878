//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide the tracker's user-facing flows: register, list, advance,
//!   readdress and cancel.
//! - Delegate persistence and the `registered` guard to the repository.
//!
//! # Invariants
//! - `next_status` never skips or rewinds a lifecycle step.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoError, RepoResult};
use log::info;

/// Use-case service wrapper for parcel tracking.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns the stored record.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let mut parcel = Parcel::new(client, address);
        parcel.number = self.repo.add(&parcel)?;
        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            parcel.number, client
        );
        Ok(parcel)
    }

    /// Loads one parcel.
    pub fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    /// Lists all parcels of `client`.
    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        self.repo.get_by_client(client)
    }

    /// Moves a parcel one lifecycle step forward.
    ///
    /// Returns the new status, or `None` when the parcel is already delivered.
    /// Fails with `NotFound` for unknown numbers, including a parcel removed
    /// after it was read but before its status was written.
    pub fn next_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let parcel = self.repo.get(number)?;
        let Some(next) = parcel.status.next() else {
            info!(
                "event=parcel_next_status module=service status=skipped number={} reason=final_status",
                number
            );
            return Ok(None);
        };

        if !self.repo.set_status(number, next)? {
            // Row vanished between the read and the write.
            return Err(RepoError::NotFound(number));
        }
        info!(
            "event=parcel_next_status module=service status=ok number={} from={} to={}",
            number, parcel.status, next
        );
        Ok(Some(next))
    }

    /// Changes the delivery address. Returns `false` when the parcel is
    /// missing or no longer `registered`.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<bool> {
        self.repo.set_address(number, address)
    }

    /// Cancels a parcel. Returns `false` when the parcel is missing or no
    /// longer `registered`.
    pub fn delete(&self, number: ParcelNumber) -> RepoResult<bool> {
        self.repo.delete(number)
    }
}
