use anyhow::{Result, anyhow};
use rusqlite::Row;

use folio_types::models::Deliverable;

use super::{OptionalExt, optional_timestamp, timestamp};
use crate::Database;
use crate::models::NewDeliverable;

const DELIVERABLE_COLUMNS: &str = "id, booking_id, creative_id, client_id, title, description, \
                                   file_url, file_type, file_size, download_count, uploaded_at, \
                                   expires_at, created_at, updated_at";

impl Database {
    pub fn insert_deliverable(&self, deliverable: &NewDeliverable) -> Result<Deliverable> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO deliverables
                    (booking_id, creative_id, client_id, title, description, file_url, file_type, file_size)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    deliverable.booking_id,
                    deliverable.creative_id,
                    deliverable.client_id,
                    deliverable.title,
                    deliverable.description,
                    deliverable.file_url,
                    deliverable.file_type,
                    deliverable.file_size,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let sql = format!("SELECT {DELIVERABLE_COLUMNS} FROM deliverables WHERE id = ?1");
            conn.prepare(&sql)?
                .query_row([id], deliverable_from_row)
                .optional()?
                .ok_or_else(|| anyhow!("Deliverable {} vanished after insert", id))
        })
    }

    pub fn get_booking_deliverables(&self, booking_id: i64) -> Result<Vec<Deliverable>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {DELIVERABLE_COLUMNS} FROM deliverables WHERE booking_id = ?1 ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([booking_id], deliverable_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn deliverable_from_row(row: &Row<'_>) -> rusqlite::Result<Deliverable> {
    Ok(Deliverable {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        creative_id: row.get(2)?,
        client_id: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        file_url: row.get(6)?,
        file_type: row.get(7)?,
        file_size: row.get(8)?,
        download_count: row.get(9)?,
        uploaded_at: timestamp(row, 10)?,
        expires_at: optional_timestamp(row, 11)?,
        created_at: timestamp(row, 12)?,
        updated_at: timestamp(row, 13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures;

    #[test]
    fn deliverables_belong_to_their_booking() {
        let db = Database::open_in_memory().unwrap();
        let client = fixtures::user(&db, "client");
        let (_, profile) = fixtures::creative(&db, "creative");
        let booking = fixtures::booking(&db, client.id, profile.id);
        let other = fixtures::booking(&db, client.id, profile.id);

        let stored = db
            .insert_deliverable(&NewDeliverable {
                booking_id: booking.id,
                creative_id: profile.id,
                client_id: client.id,
                title: "Final selects".into(),
                description: None,
                file_url: "https://files.example.com/selects.zip".into(),
                file_type: "zip".into(),
                file_size: 48_000_000,
            })
            .unwrap();
        assert_eq!(stored.download_count, 0);
        assert!(stored.expires_at.is_none());

        let listed = db.get_booking_deliverables(booking.id).unwrap();
        assert_eq!(listed, vec![stored]);
        assert!(db.get_booking_deliverables(other.id).unwrap().is_empty());
    }
}
