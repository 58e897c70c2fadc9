use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};

use folio_types::models::{Conversation, Message};

use super::{OptionalExt, optional_timestamp, timestamp};
use crate::Database;
use crate::models::NewMessage;

const CONVERSATION_COLUMNS: &str = "id, participant_one_id, participant_two_id, booking_id, \
                                    last_message, last_message_at, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, content, attachment_url, \
                               attachment_type, is_read, created_at";

impl Database {
    // -- Conversations --

    pub fn get_conversation(&self, id: i64) -> Result<Option<Conversation>> {
        self.with_conn(|conn| query_conversation(conn, id))
    }

    /// Returns the existing conversation between the two users, or creates one
    /// with `starter` as participant one.
    pub fn find_or_create_conversation(
        &self,
        starter: i64,
        other: i64,
        booking_id: Option<i64>,
    ) -> Result<Conversation> {
        self.with_conn_mut(|conn| {
            if let Some(existing) = query_conversation_between(conn, starter, other)? {
                return Ok(existing);
            }

            conn.execute(
                "INSERT INTO conversations (participant_one_id, participant_two_id, booking_id)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![starter, other, booking_id],
            )?;
            let id = conn.last_insert_rowid();
            query_conversation(conn, id)?
                .ok_or_else(|| anyhow!("Conversation {} vanished after insert", id))
        })
    }

    /// Conversations the user takes part in, most recent activity first.
    pub fn get_user_conversations(&self, user_id: i64) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE participant_one_id = ?1 OR participant_two_id = ?1
                 ORDER BY COALESCE(last_message_at, created_at) DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], conversation_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Messages --

    /// Inserts an unread message and records it as the conversation's latest.
    pub fn insert_message(&self, message: &NewMessage) -> Result<Message> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages
                    (conversation_id, sender_id, content, attachment_url, attachment_type, is_read)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                rusqlite::params![
                    message.conversation_id,
                    message.sender_id,
                    message.content,
                    message.attachment_url,
                    message.attachment_type,
                ],
            )?;
            let id = conn.last_insert_rowid();

            let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1");
            let stored = conn
                .prepare(&sql)?
                .query_row([id], message_from_row)
                .optional()?
                .ok_or_else(|| anyhow!("Message {} vanished after insert", id))?;

            conn.execute(
                "UPDATE conversations
                 SET last_message = ?2, last_message_at = ?3, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    message.conversation_id,
                    message.content,
                    super::format_timestamp(stored.created_at),
                ],
            )?;

            Ok(stored)
        })
    }

    /// Messages in send order.
    pub fn get_conversation_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at, id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([conversation_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_conversation(conn: &Connection, id: i64) -> Result<Option<Conversation>> {
    let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([id], conversation_from_row).optional()
}

fn query_conversation_between(
    conn: &Connection,
    user_a: i64,
    user_b: i64,
) -> Result<Option<Conversation>> {
    let sql = format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations
         WHERE (participant_one_id = ?1 AND participant_two_id = ?2)
            OR (participant_one_id = ?2 AND participant_two_id = ?1)
         ORDER BY id
         LIMIT 1"
    );
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([user_a, user_b], conversation_from_row)
        .optional()
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        participant_one_id: row.get(1)?,
        participant_two_id: row.get(2)?,
        booking_id: row.get(3)?,
        last_message: row.get(4)?,
        last_message_at: optional_timestamp(row, 5)?,
        created_at: timestamp(row, 6)?,
        updated_at: timestamp(row, 7)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        attachment_url: row.get(4)?,
        attachment_type: row.get(5)?,
        is_read: row.get(6)?,
        created_at: timestamp(row, 7)?,
    })
}
