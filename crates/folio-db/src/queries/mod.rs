mod availability;
mod bookings;
mod deliverables;
mod gigs;
mod messaging;
mod portfolio;
mod profiles;
mod reviews;
mod transactions;
mod users;

use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

/// SQLite's `datetime('now')` layout. Timestamps written from Rust use the
/// same layout so they sort together.
const SQLITE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(SQLITE_TIMESTAMP).to_string()
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    raw.parse::<DateTime<Utc>>().or_else(|_| {
        // SQLite stores timestamps without a timezone; they are UTC.
        NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP).map(|ndt| ndt.and_utc())
    })
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn optional_timestamp(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| parse_timestamp(&r).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Reads a status-like column stored as text.
pub(crate) fn text_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn optional_text_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| r.parse().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use folio_types::models::{Booking, CreativeProfile, User};

    use crate::Database;
    use crate::models::{IdentityFields, NewBooking, ProfileUpdate, UpsertUser};

    pub fn user(db: &Database, open_id: &str) -> User {
        db.upsert_user(&UpsertUser {
            open_id: open_id.to_string(),
            identity: Some(IdentityFields {
                name: Some(format!("{open_id} name")),
                email: None,
                login_method: Some("email".into()),
            }),
            role: None,
            last_signed_in: Utc::now(),
        })
        .unwrap();
        db.get_user_by_open_id(open_id).unwrap().unwrap()
    }

    pub fn creative(db: &Database, open_id: &str) -> (User, CreativeProfile) {
        let user = user(db, open_id);
        let profile = db
            .upsert_profile(
                user.id,
                &ProfileUpdate {
                    business_name: Some(format!("{open_id} studio")),
                    categories: Some(vec!["photography".into()]),
                    location: Some("Lagos".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        (user, profile)
    }

    pub fn booking(db: &Database, client_id: i64, creative_id: i64) -> Booking {
        db.insert_booking(&NewBooking {
            client_id,
            creative_id,
            service_type: "Portrait session".into(),
            description: Some("Headshots".into()),
            booking_date: "2026-11-02".into(),
            start_time: "10:00".into(),
            end_time: "12:30".into(),
            duration: 150,
            location: Some("Studio".into()),
            total_price: 40_000,
            deposit_amount: 10_000,
        })
        .unwrap()
    }
}
