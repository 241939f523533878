use parcel_core::db::open_db_in_memory;
use parcel_core::{
    ClientId, Parcel, ParcelNumber, ParcelRepository, ParcelService, ParcelStatus, RepoError,
    RepoResult, SqliteParcelRepository,
};

/// Repository whose row disappears between the read and the status write.
struct VanishingRepository {
    parcel: Parcel,
}

impl ParcelRepository for VanishingRepository {
    fn add(&self, _parcel: &Parcel) -> RepoResult<ParcelNumber> {
        Ok(self.parcel.number)
    }

    fn get(&self, _number: ParcelNumber) -> RepoResult<Parcel> {
        Ok(self.parcel.clone())
    }

    fn get_by_client(&self, _client: ClientId) -> RepoResult<Vec<Parcel>> {
        Ok(Vec::new())
    }

    fn set_status(&self, _number: ParcelNumber, _status: ParcelStatus) -> RepoResult<bool> {
        Ok(false)
    }

    fn set_address(&self, _number: ParcelNumber, _address: &str) -> RepoResult<bool> {
        Ok(false)
    }

    fn delete(&self, _number: ParcelNumber) -> RepoResult<bool> {
        Ok(false)
    }
}

#[test]
fn register_stores_a_registered_parcel() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let parcel = service.register(7, "Pskov, Sadovaya 5").unwrap();
    assert!(parcel.number > 0);
    assert_eq!(parcel.status, ParcelStatus::Registered);
    assert_eq!(service.get(parcel.number).unwrap(), parcel);
}

#[test]
fn next_status_walks_lifecycle_and_stops_at_delivered() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let parcel = service.register(7, "Pskov").unwrap();
    assert_eq!(
        service.next_status(parcel.number).unwrap(),
        Some(ParcelStatus::Sent)
    );
    assert_eq!(
        service.next_status(parcel.number).unwrap(),
        Some(ParcelStatus::Delivered)
    );
    assert_eq!(service.next_status(parcel.number).unwrap(), None);
    assert_eq!(
        service.get(parcel.number).unwrap().status,
        ParcelStatus::Delivered
    );
}

#[test]
fn next_status_of_missing_parcel_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    assert!(service.next_status(404).unwrap_err().is_not_found());
}

#[test]
fn next_status_reports_not_found_when_write_matches_no_row() {
    let mut parcel = Parcel::new(7, "Pskov");
    parcel.number = 12;
    let service = ParcelService::new(VanishingRepository { parcel });

    let err = service.next_status(12).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(12)));
}

#[test]
fn change_address_and_delete_follow_registered_guard() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let kept = service.register(9, "first").unwrap();
    let dropped = service.register(9, "second").unwrap();

    assert!(service.change_address(kept.number, "first, flat 2").unwrap());
    service.next_status(kept.number).unwrap();
    assert!(!service.change_address(kept.number, "ignored").unwrap());
    assert!(!service.delete(kept.number).unwrap());

    assert!(service.delete(dropped.number).unwrap());

    let remaining = service.client_parcels(9).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].number, kept.number);
    assert_eq!(remaining[0].address, "first, flat 2");
    assert_eq!(remaining[0].status, ParcelStatus::Sent);
}

#[test]
fn parcel_serializes_status_in_storage_spelling() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let parcel = service.register(3, "Samara").unwrap();
    let json = serde_json::to_value(&parcel).unwrap();
    assert_eq!(json["status"], "registered");
    assert_eq!(json["client"], 3);
}
