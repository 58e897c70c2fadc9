use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};

use folio_types::models::{Booking, BookingStatus};

use super::{OptionalExt, text_enum, timestamp};
use crate::Database;
use crate::models::NewBooking;

const BOOKING_COLUMNS: &str = "id, client_id, creative_id, service_type, description, \
                               booking_date, start_time, end_time, duration, location, \
                               total_price, deposit_amount, deposit_paid, status, \
                               payment_method, transaction_id, notes, created_at, updated_at";

impl Database {
    /// Inserts a `pending` booking and returns it.
    pub fn insert_booking(&self, booking: &NewBooking) -> Result<Booking> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO bookings
                    (client_id, creative_id, service_type, description, booking_date,
                     start_time, end_time, duration, location, total_price, deposit_amount, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    booking.client_id,
                    booking.creative_id,
                    booking.service_type,
                    booking.description,
                    booking.booking_date,
                    booking.start_time,
                    booking.end_time,
                    booking.duration,
                    booking.location,
                    booking.total_price,
                    booking.deposit_amount,
                    BookingStatus::Pending.as_str(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_booking(conn, id)?.ok_or_else(|| anyhow!("Booking {} vanished after insert", id))
        })
    }

    pub fn get_booking(&self, id: i64) -> Result<Option<Booking>> {
        self.with_conn(|conn| query_booking(conn, id))
    }

    pub fn get_bookings_by_client(&self, client_id: i64) -> Result<Vec<Booking>> {
        self.with_conn(|conn| query_bookings(conn, "client_id = ?1", client_id))
    }

    /// `creative_id` is a profile id.
    pub fn get_bookings_by_creative(&self, creative_id: i64) -> Result<Vec<Booking>> {
        self.with_conn(|conn| query_bookings(conn, "creative_id = ?1", creative_id))
    }

    /// Overwrites the status unconditionally. Returns the updated row, or
    /// `None` when the booking does not exist.
    pub fn update_booking_status(&self, id: i64, status: BookingStatus) -> Result<Option<Booking>> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE bookings SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, status.as_str()],
            )?;
            query_booking(conn, id)
        })
    }
}

fn query_booking(conn: &Connection, id: i64) -> Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([id], booking_from_row).optional()
}

fn query_bookings(conn: &Connection, predicate: &str, value: i64) -> Result<Vec<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE {predicate} ORDER BY id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([value], booking_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        client_id: row.get(1)?,
        creative_id: row.get(2)?,
        service_type: row.get(3)?,
        description: row.get(4)?,
        booking_date: row.get(5)?,
        start_time: row.get(6)?,
        end_time: row.get(7)?,
        duration: row.get(8)?,
        location: row.get(9)?,
        total_price: row.get(10)?,
        deposit_amount: row.get(11)?,
        deposit_paid: row.get(12)?,
        status: text_enum(row, 13)?,
        payment_method: row.get(14)?,
        transaction_id: row.get(15)?,
        notes: row.get(16)?,
        created_at: timestamp(row, 17)?,
        updated_at: timestamp(row, 18)?,
    })
}
