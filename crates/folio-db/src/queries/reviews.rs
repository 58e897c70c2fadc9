use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};

use folio_types::models::Review;

use super::{OptionalExt, timestamp};
use crate::Database;
use crate::models::NewReview;

const REVIEW_COLUMNS: &str = "id, booking_id, reviewer_id, creative_id, rating, title, comment, \
                              is_verified, is_published, created_at, updated_at";

impl Database {
    /// Inserts a verified, published review.
    pub fn insert_review(&self, review: &NewReview) -> Result<Review> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO reviews
                    (booking_id, reviewer_id, creative_id, rating, title, comment, is_verified)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
                rusqlite::params![
                    review.booking_id,
                    review.reviewer_id,
                    review.creative_id,
                    review.rating,
                    review.title,
                    review.comment,
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_review(conn, "id = ?1", id)?
                .ok_or_else(|| anyhow!("Review {} vanished after insert", id))
        })
    }

    /// Published reviews for a profile, newest first.
    pub fn get_creative_reviews(&self, creative_id: i64) -> Result<Vec<Review>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews
                 WHERE creative_id = ?1 AND is_published = 1
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([creative_id], review_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Mean rating over every review of the profile; 0 when it has none.
    pub fn get_average_rating(&self, creative_id: i64) -> Result<f64> {
        let ratings = self.with_conn(|conn| query_ratings(conn, creative_id))?;
        Ok(mean_rating(&ratings))
    }

    /// Recomputes the profile's stored rating summary by full scan.
    pub fn refresh_profile_rating(&self, creative_id: i64) -> Result<(f64, i64)> {
        let ratings = self.with_conn(|conn| query_ratings(conn, creative_id))?;
        let average = mean_rating(&ratings);
        let total = ratings.len() as i64;
        self.set_profile_rating(creative_id, average, total)?;
        Ok((average, total))
    }
}

pub(crate) fn mean_rating(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<i64>() as f64 / ratings.len() as f64
}

fn query_ratings(conn: &Connection, creative_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT rating FROM reviews WHERE creative_id = ?1")?;
    let rows = stmt
        .query_map([creative_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(rows)
}

fn query_review(conn: &Connection, predicate: &str, value: i64) -> Result<Option<Review>> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE {predicate} LIMIT 1");
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([value], review_from_row).optional()
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        reviewer_id: row.get(2)?,
        creative_id: row.get(3)?,
        rating: row.get(4)?,
        title: row.get(5)?,
        comment: row.get(6)?,
        is_verified: row.get(7)?,
        is_published: row.get(8)?,
        created_at: timestamp(row, 9)?,
        updated_at: timestamp(row, 10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures;

    fn review(booking_id: i64, reviewer_id: i64, creative_id: i64, rating: i64) -> NewReview {
        NewReview {
            booking_id,
            reviewer_id,
            creative_id,
            rating,
            title: None,
            comment: Some("Great shoot".into()),
        }
    }

    #[test]
    fn mean_of_no_ratings_is_zero() {
        assert_eq!(mean_rating(&[]), 0.0);
        assert_eq!(mean_rating(&[4]), 4.0);
        assert!((mean_rating(&[5, 4, 4]) - 13.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_matches_arithmetic_mean() {
        let db = Database::open_in_memory().unwrap();
        let client = fixtures::user(&db, "client");
        let (_, profile) = fixtures::creative(&db, "creative");
        assert_eq!(db.get_average_rating(profile.id).unwrap(), 0.0);

        let ratings = [5, 3, 4, 2];
        for rating in ratings {
            let booking = fixtures::booking(&db, client.id, profile.id);
            db.insert_review(&review(booking.id, client.id, profile.id, rating))
                .unwrap();
        }

        let expected = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
        assert_eq!(db.get_average_rating(profile.id).unwrap(), expected);

        let (average, total) = db.refresh_profile_rating(profile.id).unwrap();
        assert_eq!(average, expected);
        assert_eq!(total, 4);
        let stored = db.get_profile(profile.id).unwrap().unwrap();
        assert_eq!(stored.average_rating, expected);
        assert_eq!(stored.total_reviews, 4);

        assert_eq!(db.get_creative_reviews(profile.id).unwrap().len(), 4);
    }

    #[test]
    fn one_review_per_booking() {
        let db = Database::open_in_memory().unwrap();
        let client = fixtures::user(&db, "client");
        let (_, profile) = fixtures::creative(&db, "creative");
        let booking = fixtures::booking(&db, client.id, profile.id);

        let first = db
            .insert_review(&review(booking.id, client.id, profile.id, 5))
            .unwrap();
        assert!(first.is_verified);
        assert_eq!(first.booking_id, booking.id);

        let err = db
            .insert_review(&review(booking.id, client.id, profile.id, 1))
            .unwrap_err();
        assert!(crate::is_unique_violation(&err));
        assert_eq!(db.get_creative_reviews(profile.id).unwrap().len(), 1);
    }
}
