use anyhow::{Result, anyhow};
use rusqlite::Row;

use folio_types::models::PortfolioItem;

use super::{OptionalExt, timestamp};
use crate::Database;
use crate::models::NewPortfolioItem;

const ITEM_COLUMNS: &str = "id, creative_id, title, description, image_url, video_url, category, \
                            display_order, created_at, updated_at";

impl Database {
    /// New items go to the end of the profile's display order.
    pub fn insert_portfolio_item(&self, item: &NewPortfolioItem) -> Result<PortfolioItem> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO portfolio_items
                    (creative_id, title, description, image_url, video_url, category, display_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6,
                    (SELECT COUNT(*) FROM portfolio_items WHERE creative_id = ?1))",
                rusqlite::params![
                    item.creative_id,
                    item.title,
                    item.description,
                    item.image_url,
                    item.video_url,
                    item.category,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let sql = format!("SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE id = ?1");
            conn.prepare(&sql)?
                .query_row([id], item_from_row)
                .optional()?
                .ok_or_else(|| anyhow!("Portfolio item {} vanished after insert", id))
        })
    }

    pub fn get_creative_portfolio(&self, creative_id: i64) -> Result<Vec<PortfolioItem>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM portfolio_items
                 WHERE creative_id = ?1
                 ORDER BY display_order, id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([creative_id], item_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<PortfolioItem> {
    Ok(PortfolioItem {
        id: row.get(0)?,
        creative_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        video_url: row.get(5)?,
        category: row.get(6)?,
        display_order: row.get(7)?,
        created_at: timestamp(row, 8)?,
        updated_at: timestamp(row, 9)?,
    })
}
