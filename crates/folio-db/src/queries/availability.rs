use anyhow::{Result, anyhow};
use rusqlite::Row;

use folio_types::models::AvailabilitySlot;

use super::{OptionalExt, timestamp};
use crate::Database;
use crate::models::NewAvailabilitySlot;

const SLOT_COLUMNS: &str = "id, creative_id, date, start_time, end_time, is_booked, created_at, updated_at";

impl Database {
    pub fn insert_availability(&self, slot: &NewAvailabilitySlot) -> Result<AvailabilitySlot> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO availability (creative_id, date, start_time, end_time, is_booked)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                rusqlite::params![slot.creative_id, slot.date, slot.start_time, slot.end_time],
            )?;
            let id = conn.last_insert_rowid();
            let sql = format!("SELECT {SLOT_COLUMNS} FROM availability WHERE id = ?1");
            conn.prepare(&sql)?
                .query_row([id], slot_from_row)
                .optional()?
                .ok_or_else(|| anyhow!("Availability slot {} vanished after insert", id))
        })
    }

    pub fn get_availability(&self, creative_id: i64) -> Result<Vec<AvailabilitySlot>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SLOT_COLUMNS} FROM availability
                 WHERE creative_id = ?1
                 ORDER BY date, start_time, id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([creative_id], slot_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn slot_from_row(row: &Row<'_>) -> rusqlite::Result<AvailabilitySlot> {
    Ok(AvailabilitySlot {
        id: row.get(0)?,
        creative_id: row.get(1)?,
        date: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        is_booked: row.get(5)?,
        created_at: timestamp(row, 6)?,
        updated_at: timestamp(row, 7)?,
    })
}
