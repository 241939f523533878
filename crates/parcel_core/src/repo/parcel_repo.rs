//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/guarded-write APIs over the `parcel` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every statement binds values through named placeholders.
//! - `set_address` and `delete` only touch rows whose status is `registered`;
//!   the predicate lives in the statement's `WHERE` clause so the check and the
//!   write are one row-level operation.
//! - Writes that match no row succeed and report `false`.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelValidationError};
use log::debug;
use rusqlite::{named_params, Connection, Row};
use thiserror::Error;

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for parcel persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ParcelValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("parcel not found: {0}")]
    NotFound(ParcelNumber),
    #[error("invalid persisted parcel data: {0}")]
    InvalidData(String),
    #[error("required table `{0}` is missing; open the database through db::open_db")]
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// A point read matched zero rows.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Lower-level storage failure: transport, constraint, schema or
    /// malformed row. Every error that is not `NotFound` lands here.
    pub fn is_storage(&self) -> bool {
        !self.is_not_found()
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for parcel operations.
///
/// Every method issues exactly one statement; no transaction spans calls.
pub trait ParcelRepository {
    /// Inserts `parcel` (its `number` is ignored) and returns the assigned number.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel, failing with `NotFound` when absent.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Lists every parcel owned by `client`; an empty list is not an error.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites the status unconditionally. Returns whether a row changed.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<bool>;
    /// Overwrites the address while the parcel is `registered`.
    /// Returns whether a row changed.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<bool>;
    /// Removes the parcel while it is `registered`. Returns whether a row was removed.
    fn delete(&self, number: ParcelNumber) -> RepoResult<bool>;
}

/// SQLite-backed parcel repository.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Wraps a connection without checking its schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking the `parcel` table exists.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_table(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        parcel.validate()?;

        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (:client, :status, :address, :created_at);",
            named_params! {
                ":client": parcel.client,
                ":status": parcel.status.as_str(),
                ":address": parcel.address.as_str(),
                ":created_at": parcel.created_at.as_str(),
            },
        )?;

        let number = self.conn.last_insert_rowid();
        debug!(
            "event=parcel_add module=repo status=ok number={} client={}",
            number, parcel.client
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE number = :number;"))?;

        let mut rows = stmt.query(named_params! { ":number": number })?;
        if let Some(row) = rows.next()? {
            return parse_parcel_row(row);
        }

        Err(RepoError::NotFound(number))
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARCEL_SELECT_SQL} WHERE client = :client ORDER BY number ASC;"
        ))?;

        let mut rows = stmt.query(named_params! { ":client": client })?;
        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row)?);
        }

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE parcel SET status = :status WHERE number = :number;",
            named_params! {
                ":status": status.as_str(),
                ":number": number,
            },
        )?;

        Ok(report_write("parcel_set_status", number, changed))
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE parcel
             SET address = :address
             WHERE number = :number
               AND status = :status;",
            named_params! {
                ":address": address,
                ":number": number,
                ":status": ParcelStatus::Registered.as_str(),
            },
        )?;

        Ok(report_write("parcel_set_address", number, changed))
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM parcel WHERE number = :number AND status = :status;",
            named_params! {
                ":number": number,
                ":status": ParcelStatus::Registered.as_str(),
            },
        )?;

        Ok(report_write("parcel_delete", number, changed))
    }
}

fn report_write(event: &str, number: ParcelNumber, changed: usize) -> bool {
    if changed == 0 {
        debug!("event={event} module=repo status=skipped number={number} reason=no_eligible_row");
        return false;
    }
    debug!("event={event} module=repo status=ok number={number}");
    true
}

fn ensure_parcel_table(conn: &Connection) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'parcel'
        );",
        [],
        |row| row.get(0),
    )?;

    if exists == 0 {
        return Err(RepoError::MissingRequiredTable("parcel"));
    }
    Ok(())
}

fn parse_parcel_row(row: &Row<'_>) -> RepoResult<Parcel> {
    let status_text: String = row.get("status")?;
    let status = ParcelStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in parcel.status"))
    })?;

    let parcel = Parcel {
        number: row.get("number")?,
        client: row.get("client")?,
        status,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    };
    parcel
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("parcel {}: {err}", parcel.number)))?;
    Ok(parcel)
}
