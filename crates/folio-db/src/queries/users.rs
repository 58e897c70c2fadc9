use anyhow::Result;
use rusqlite::{Connection, Row};

use folio_types::models::{User, UserType};

use super::{OptionalExt, format_timestamp, optional_text_enum, text_enum, timestamp};
use crate::Database;
use crate::models::UpsertUser;

const USER_COLUMNS: &str = "id, open_id, name, email, login_method, role, user_type, \
                            created_at, updated_at, last_signed_in";

impl Database {
    /// Insert or refresh a user keyed by identity-provider `open_id`.
    pub fn upsert_user(&self, user: &UpsertUser) -> Result<()> {
        let (has_identity, name, email, login_method) = match &user.identity {
            Some(fields) => (
                true,
                fields.name.as_deref(),
                fields.email.as_deref(),
                fields.login_method.as_deref(),
            ),
            None => (false, None, None, None),
        };

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (open_id, name, email, login_method, role, last_signed_in)
                 VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 'user'), ?6)
                 ON CONFLICT(open_id) DO UPDATE SET
                    name = CASE WHEN ?7 THEN excluded.name ELSE users.name END,
                    email = CASE WHEN ?7 THEN excluded.email ELSE users.email END,
                    login_method = CASE WHEN ?7 THEN excluded.login_method ELSE users.login_method END,
                    role = COALESCE(?5, users.role),
                    last_signed_in = excluded.last_signed_in,
                    updated_at = datetime('now')",
                rusqlite::params![
                    user.open_id,
                    name,
                    email,
                    login_method,
                    user.role.map(|r| r.as_str()),
                    format_timestamp(user.last_signed_in),
                    has_identity,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_open_id(&self, open_id: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "open_id = ?1", open_id))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    pub fn set_user_type(&self, user_id: i64, user_type: UserType) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET user_type = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![user_id, user_type.as_str()],
            )?;
            Ok(())
        })
    }
}

fn query_user<P: rusqlite::ToSql>(
    conn: &Connection,
    predicate: &str,
    value: P,
) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate} LIMIT 1");
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([value], user_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        open_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        login_method: row.get(4)?,
        role: text_enum(row, 5)?,
        user_type: optional_text_enum(row, 6)?,
        created_at: timestamp(row, 7)?,
        updated_at: timestamp(row, 8)?,
        last_signed_in: timestamp(row, 9)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use folio_types::models::Role;

    use super::*;
    use crate::models::IdentityFields;

    fn identity(name: &str) -> Option<IdentityFields> {
        Some(IdentityFields {
            name: Some(name.into()),
            email: Some(format!("{name}@example.com")),
            login_method: Some("google".into()),
        })
    }

    #[test]
    fn upsert_inserts_then_updates_identity() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();

        db.upsert_user(&UpsertUser {
            open_id: "oid-1".into(),
            identity: identity("ada"),
            role: None,
            last_signed_in: now,
        })
        .unwrap();

        let user = db.get_user_by_open_id("oid-1").unwrap().unwrap();
        assert_eq!(user.name.as_deref(), Some("ada"));
        assert_eq!(user.role, Role::User);
        assert_eq!(user.user_type, Some(UserType::Client));

        db.upsert_user(&UpsertUser {
            open_id: "oid-1".into(),
            identity: identity("ada l."),
            role: None,
            last_signed_in: now,
        })
        .unwrap();

        let again = db.get_user_by_open_id("oid-1").unwrap().unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(again.name.as_deref(), Some("ada l."));
    }

    #[test]
    fn touch_keeps_identity_and_role() {
        let db = Database::open_in_memory().unwrap();
        let first = Utc::now() - Duration::days(3);

        db.upsert_user(&UpsertUser {
            open_id: "owner".into(),
            identity: identity("grace"),
            role: Some(Role::Admin),
            last_signed_in: first,
        })
        .unwrap();

        let later = Utc::now();
        db.upsert_user(&UpsertUser {
            open_id: "owner".into(),
            identity: None,
            role: None,
            last_signed_in: later,
        })
        .unwrap();

        let user = db.get_user_by_open_id("owner").unwrap().unwrap();
        assert_eq!(user.name.as_deref(), Some("grace"));
        assert_eq!(user.role, Role::Admin);
        assert_eq!(format_timestamp(user.last_signed_in), format_timestamp(later));
    }

    #[test]
    fn lookup_by_id_and_user_type() {
        let db = Database::open_in_memory().unwrap();
        let user = crate::queries::fixtures::user(&db, "someone");

        db.set_user_type(user.id, UserType::Creative).unwrap();
        let user = db.get_user_by_id(user.id).unwrap().unwrap();
        assert_eq!(user.user_type, Some(UserType::Creative));
        assert!(db.get_user_by_id(9_999).unwrap().is_none());
    }
}
