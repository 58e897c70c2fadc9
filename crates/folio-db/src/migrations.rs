use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            open_id         TEXT NOT NULL UNIQUE,
            name            TEXT,
            email           TEXT,
            login_method    TEXT,
            role            TEXT NOT NULL DEFAULT 'user',
            user_type       TEXT DEFAULT 'client',
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
            last_signed_in  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS creative_profiles (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         INTEGER NOT NULL UNIQUE REFERENCES users(id),
            business_name   TEXT,
            bio             TEXT,
            categories      TEXT NOT NULL DEFAULT '[]',
            location        TEXT,
            base_price      INTEGER,
            hourly_rate     INTEGER,
            profile_image   TEXT,
            cover_image     TEXT,
            average_rating  REAL NOT NULL DEFAULT 0,
            total_reviews   INTEGER NOT NULL DEFAULT 0,
            is_verified     INTEGER NOT NULL DEFAULT 0,
            is_active       INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS bookings (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id       INTEGER NOT NULL REFERENCES users(id),
            creative_id     INTEGER NOT NULL REFERENCES creative_profiles(id),
            service_type    TEXT,
            description     TEXT,
            booking_date    TEXT NOT NULL,
            start_time      TEXT NOT NULL,
            end_time        TEXT NOT NULL,
            duration        INTEGER,
            location        TEXT,
            total_price     INTEGER NOT NULL,
            deposit_amount  INTEGER NOT NULL,
            deposit_paid    INTEGER NOT NULL DEFAULT 0,
            status          TEXT NOT NULL DEFAULT 'pending',
            payment_method  TEXT,
            transaction_id  TEXT,
            notes           TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_client ON bookings(client_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_creative ON bookings(creative_id);

        -- is_booked is informational: nothing claims or releases slots.
        CREATE TABLE IF NOT EXISTS availability (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            creative_id     INTEGER NOT NULL REFERENCES creative_profiles(id),
            date            TEXT NOT NULL,
            start_time      TEXT NOT NULL,
            end_time        TEXT NOT NULL,
            is_booked       INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_availability_creative ON availability(creative_id);

        CREATE TABLE IF NOT EXISTS conversations (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            participant_one_id  INTEGER NOT NULL REFERENCES users(id),
            participant_two_id  INTEGER NOT NULL REFERENCES users(id),
            booking_id          INTEGER REFERENCES bookings(id),
            last_message        TEXT,
            last_message_at     TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_one ON conversations(participant_one_id);
        CREATE INDEX IF NOT EXISTS idx_conversations_two ON conversations(participant_two_id);

        CREATE TABLE IF NOT EXISTS messages (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id     INTEGER NOT NULL REFERENCES conversations(id),
            sender_id           INTEGER NOT NULL REFERENCES users(id),
            content             TEXT,
            attachment_url      TEXT,
            attachment_type     TEXT,
            is_read             INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages(conversation_id, created_at);

        CREATE TABLE IF NOT EXISTS deliverables (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            booking_id      INTEGER NOT NULL REFERENCES bookings(id),
            creative_id     INTEGER NOT NULL REFERENCES creative_profiles(id),
            client_id       INTEGER NOT NULL REFERENCES users(id),
            title           TEXT,
            description     TEXT,
            file_url        TEXT,
            file_type       TEXT,
            file_size       INTEGER,
            download_count  INTEGER NOT NULL DEFAULT 0,
            uploaded_at     TEXT NOT NULL DEFAULT (datetime('now')),
            expires_at      TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_deliverables_booking ON deliverables(booking_id);

        CREATE TABLE IF NOT EXISTS reviews (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            booking_id      INTEGER NOT NULL UNIQUE REFERENCES bookings(id),
            reviewer_id     INTEGER NOT NULL REFERENCES users(id),
            creative_id     INTEGER NOT NULL REFERENCES creative_profiles(id),
            rating          INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            title           TEXT,
            comment         TEXT,
            is_verified     INTEGER NOT NULL DEFAULT 1,
            is_published    INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_creative ON reviews(creative_id);

        CREATE TABLE IF NOT EXISTS gig_posts (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id           INTEGER NOT NULL REFERENCES users(id),
            title               TEXT NOT NULL,
            description         TEXT,
            category            TEXT,
            budget              INTEGER,
            location            TEXT,
            deadline            TEXT,
            status              TEXT NOT NULL DEFAULT 'open',
            applications_count  INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_gig_posts_status ON gig_posts(status, created_at);

        CREATE TABLE IF NOT EXISTS gig_applications (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            gig_post_id     INTEGER NOT NULL REFERENCES gig_posts(id),
            creative_id     INTEGER NOT NULL REFERENCES creative_profiles(id),
            proposed_price  INTEGER,
            cover_letter    TEXT,
            portfolio_links TEXT,
            status          TEXT NOT NULL DEFAULT 'pending',
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_gig_applications_post ON gig_applications(gig_post_id);

        CREATE TABLE IF NOT EXISTS transactions (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            booking_id              INTEGER REFERENCES bookings(id),
            gig_post_id             INTEGER REFERENCES gig_posts(id),
            payer_id                INTEGER NOT NULL REFERENCES users(id),
            payee_id                INTEGER NOT NULL REFERENCES users(id),
            amount                  INTEGER NOT NULL,
            currency                TEXT NOT NULL DEFAULT 'USD',
            type                    TEXT NOT NULL DEFAULT 'deposit',
            payment_method          TEXT NOT NULL,
            external_transaction_id TEXT,
            status                  TEXT NOT NULL DEFAULT 'pending',
            metadata                TEXT,
            created_at              TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at              TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_payer ON transactions(payer_id);
        CREATE INDEX IF NOT EXISTS idx_transactions_payee ON transactions(payee_id);

        CREATE TABLE IF NOT EXISTS portfolio_items (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            creative_id     INTEGER NOT NULL REFERENCES creative_profiles(id),
            title           TEXT,
            description     TEXT,
            image_url       TEXT,
            video_url       TEXT,
            category        TEXT,
            display_order   INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_portfolio_creative ON portfolio_items(creative_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
