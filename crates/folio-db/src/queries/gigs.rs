use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};

use folio_types::models::{ApplicationStatus, GigApplication, GigPost, GigStatus};

use super::{OptionalExt, text_enum, timestamp};
use crate::Database;
use crate::models::{NewGigApplication, NewGigPost};

const POST_COLUMNS: &str = "id, client_id, title, description, category, budget, location, \
                            deadline, status, applications_count, created_at, updated_at";

const APPLICATION_COLUMNS: &str = "id, gig_post_id, creative_id, proposed_price, cover_letter, \
                                   portfolio_links, status, created_at, updated_at";

impl Database {
    // -- Posts --

    pub fn insert_gig_post(&self, post: &NewGigPost) -> Result<GigPost> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO gig_posts
                    (client_id, title, description, category, budget, location, deadline, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    post.client_id,
                    post.title,
                    post.description,
                    post.category,
                    post.budget,
                    post.location,
                    post.deadline,
                    GigStatus::Open.as_str(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_post(conn, id)?.ok_or_else(|| anyhow!("Gig post {} vanished after insert", id))
        })
    }

    pub fn get_gig_post(&self, id: i64) -> Result<Option<GigPost>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// Open posts, newest first.
    pub fn get_open_gig_posts(&self, limit: u32, offset: u32) -> Result<Vec<GigPost>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM gig_posts
                 WHERE status = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![GigStatus::Open.as_str(), limit, offset],
                    post_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Applications --

    /// Inserts a `pending` application and bumps the post's application count.
    pub fn insert_gig_application(&self, application: &NewGigApplication) -> Result<GigApplication> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO gig_applications
                    (gig_post_id, creative_id, proposed_price, cover_letter, portfolio_links, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    application.gig_post_id,
                    application.creative_id,
                    application.proposed_price,
                    application.cover_letter,
                    application.portfolio_links,
                    ApplicationStatus::Pending.as_str(),
                ],
            )?;
            let id = conn.last_insert_rowid();

            conn.execute(
                "UPDATE gig_posts
                 SET applications_count = applications_count + 1, updated_at = datetime('now')
                 WHERE id = ?1",
                [application.gig_post_id],
            )?;

            let sql = format!("SELECT {APPLICATION_COLUMNS} FROM gig_applications WHERE id = ?1");
            conn.prepare(&sql)?
                .query_row([id], application_from_row)
                .optional()?
                .ok_or_else(|| anyhow!("Gig application {} vanished after insert", id))
        })
    }

    pub fn get_gig_applications(&self, gig_post_id: i64) -> Result<Vec<GigApplication>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {APPLICATION_COLUMNS} FROM gig_applications
                 WHERE gig_post_id = ?1
                 ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([gig_post_id], application_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<GigPost>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM gig_posts WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([id], post_from_row).optional()
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<GigPost> {
    Ok(GigPost {
        id: row.get(0)?,
        client_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        budget: row.get(5)?,
        location: row.get(6)?,
        deadline: row.get(7)?,
        status: text_enum(row, 8)?,
        applications_count: row.get(9)?,
        created_at: timestamp(row, 10)?,
        updated_at: timestamp(row, 11)?,
    })
}

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<GigApplication> {
    Ok(GigApplication {
        id: row.get(0)?,
        gig_post_id: row.get(1)?,
        creative_id: row.get(2)?,
        proposed_price: row.get(3)?,
        cover_letter: row.get(4)?,
        portfolio_links: row.get(5)?,
        status: text_enum(row, 6)?,
        created_at: timestamp(row, 7)?,
        updated_at: timestamp(row, 8)?,
    })
}
