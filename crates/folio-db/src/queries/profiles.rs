use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};

use folio_types::models::CreativeProfile;

use super::{OptionalExt, conversion_error, timestamp};
use crate::Database;
use crate::models::{ProfileSearch, ProfileUpdate};

const PROFILE_COLUMNS: &str = "id, user_id, business_name, bio, categories, location, \
                               base_price, hourly_rate, profile_image, cover_image, \
                               average_rating, total_reviews, is_verified, is_active, \
                               created_at, updated_at";

impl Database {
    pub fn get_profile_by_user(&self, user_id: i64) -> Result<Option<CreativeProfile>> {
        self.with_conn(|conn| query_profile(conn, "user_id = ?1", user_id))
    }

    pub fn get_profile(&self, id: i64) -> Result<Option<CreativeProfile>> {
        self.with_conn(|conn| query_profile(conn, "id = ?1", id))
    }

    /// Applies `update` to the user's profile, creating the profile first if
    /// the user has none. Returns the stored row.
    pub fn upsert_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<CreativeProfile> {
        let categories = update
            .categories
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.with_conn_mut(|conn| {
            let existing = query_profile(conn, "user_id = ?1", user_id)?;
            let params = rusqlite::params![
                user_id,
                update.business_name,
                update.bio,
                categories,
                update.location,
                update.base_price,
                update.hourly_rate,
                update.profile_image,
                update.cover_image,
            ];

            if existing.is_some() {
                conn.execute(
                    "UPDATE creative_profiles SET
                        business_name = COALESCE(?2, business_name),
                        bio           = COALESCE(?3, bio),
                        categories    = COALESCE(?4, categories),
                        location      = COALESCE(?5, location),
                        base_price    = COALESCE(?6, base_price),
                        hourly_rate   = COALESCE(?7, hourly_rate),
                        profile_image = COALESCE(?8, profile_image),
                        cover_image   = COALESCE(?9, cover_image),
                        updated_at    = datetime('now')
                     WHERE user_id = ?1",
                    params,
                )?;
            } else {
                conn.execute(
                    "INSERT INTO creative_profiles
                        (user_id, business_name, bio, categories, location, base_price,
                         hourly_rate, profile_image, cover_image)
                     VALUES (?1, ?2, ?3, COALESCE(?4, '[]'), ?5, ?6, ?7, ?8, ?9)",
                    params,
                )?;
            }

            query_profile(conn, "user_id = ?1", user_id)?
                .ok_or_else(|| anyhow!("Profile for user {} vanished after write", user_id))
        })
    }

    /// Active profiles matching every provided filter, in id order.
    pub fn search_profiles(&self, search: &ProfileSearch) -> Result<Vec<CreativeProfile>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PROFILE_COLUMNS} FROM creative_profiles
                 WHERE is_active = 1
                   AND (?1 IS NULL OR EXISTS (
                        SELECT 1 FROM json_each(creative_profiles.categories) WHERE value = ?1))
                   AND (?2 IS NULL OR location = ?2 COLLATE NOCASE)
                   AND (?3 IS NULL OR average_rating >= ?3)
                 ORDER BY id
                 LIMIT ?4 OFFSET ?5"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![
                        search.category,
                        search.location,
                        search.min_rating,
                        search.limit,
                        search.offset,
                    ],
                    profile_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Stores a freshly computed rating summary on the profile.
    pub fn set_profile_rating(&self, profile_id: i64, average: f64, total: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE creative_profiles
                 SET average_rating = ?2, total_reviews = ?3, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![profile_id, average, total],
            )?;
            Ok(())
        })
    }
}

fn query_profile(
    conn: &Connection,
    predicate: &str,
    value: i64,
) -> Result<Option<CreativeProfile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM creative_profiles WHERE {predicate} LIMIT 1");
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([value], profile_from_row).optional()
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<CreativeProfile> {
    let raw_categories: String = row.get(4)?;
    let categories: Vec<String> =
        serde_json::from_str(&raw_categories).map_err(|e| conversion_error(4, e))?;

    Ok(CreativeProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        business_name: row.get(2)?,
        bio: row.get(3)?,
        categories,
        location: row.get(5)?,
        base_price: row.get(6)?,
        hourly_rate: row.get(7)?,
        profile_image: row.get(8)?,
        cover_image: row.get(9)?,
        average_rating: row.get(10)?,
        total_reviews: row.get(11)?,
        is_verified: row.get(12)?,
        is_active: row.get(13)?,
        created_at: timestamp(row, 14)?,
        updated_at: timestamp(row, 15)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures;

    fn search() -> ProfileSearch {
        ProfileSearch {
            limit: 20,
            ..Default::default()
        }
    }

    #[test]
    fn upsert_creates_then_patches() {
        let db = Database::open_in_memory().unwrap();
        let user = fixtures::user(&db, "maker");

        let created = db
            .upsert_profile(
                user.id,
                &ProfileUpdate {
                    business_name: Some("Maker Studio".into()),
                    bio: Some("Film and digital".into()),
                    categories: Some(vec!["photography".into(), "video".into()]),
                    base_price: Some(50_000),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(created.user_id, user.id);
        assert_eq!(created.categories, vec!["photography", "video"]);
        assert!(created.is_active);
        assert_eq!(created.average_rating, 0.0);

        let patched = db
            .upsert_profile(
                user.id,
                &ProfileUpdate {
                    hourly_rate: Some(7_500),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(patched.id, created.id);
        assert_eq!(patched.business_name.as_deref(), Some("Maker Studio"));
        assert_eq!(patched.base_price, Some(50_000));
        assert_eq!(patched.hourly_rate, Some(7_500));

        assert_eq!(db.get_profile(created.id).unwrap().unwrap().id, created.id);
        assert!(db.get_profile_by_user(user.id + 100).unwrap().is_none());
    }

    #[test]
    fn search_filters_and_pages() {
        let db = Database::open_in_memory().unwrap();
        let (_, lagos) = fixtures::creative(&db, "a");
        let (_, _) = fixtures::creative(&db, "b");
        let (c_user, _) = fixtures::creative(&db, "c");
        db.upsert_profile(
            c_user.id,
            &ProfileUpdate {
                categories: Some(vec!["styling".into()]),
                location: Some("Accra".into()),
                ..Default::default()
            },
        )
        .unwrap();
        db.set_profile_rating(lagos.id, 4.5, 2).unwrap();

        assert_eq!(db.search_profiles(&search()).unwrap().len(), 3);

        let styling = db
            .search_profiles(&ProfileSearch {
                category: Some("styling".into()),
                ..search()
            })
            .unwrap();
        assert_eq!(styling.len(), 1);
        assert_eq!(styling[0].user_id, c_user.id);

        let in_lagos = db
            .search_profiles(&ProfileSearch {
                location: Some("lagos".into()),
                ..search()
            })
            .unwrap();
        assert_eq!(in_lagos.len(), 2);

        let rated = db
            .search_profiles(&ProfileSearch {
                min_rating: Some(4.0),
                ..search()
            })
            .unwrap();
        assert_eq!(rated.len(), 1);
        assert_eq!(rated[0].id, lagos.id);
        assert_eq!(rated[0].total_reviews, 2);

        let page = db
            .search_profiles(&ProfileSearch {
                limit: 2,
                offset: 2,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.len(), 1);
    }
}
