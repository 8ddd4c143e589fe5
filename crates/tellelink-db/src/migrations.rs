use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                role        TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE posts (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                slug        TEXT NOT NULL UNIQUE,
                owner_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_posts_owner
                ON posts(owner_id, created_at);

            CREATE TABLE links (
                id            TEXT PRIMARY KEY,
                post_id       TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                button_name   TEXT NOT NULL,
                url           TEXT NOT NULL,
                original_url  TEXT,
                position      INTEGER NOT NULL CHECK (position >= 0),
                UNIQUE(post_id, position)
            );

            CREATE TABLE reports (
                id              TEXT PRIMARY KEY,
                post_id         TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                link_id         TEXT REFERENCES links(id) ON DELETE CASCADE,
                comment         TEXT NOT NULL,
                reporter_email  TEXT,
                status          TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'resolved')),
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_reports_created
                ON reports(created_at);

            CREATE TABLE user_settings (
                user_id                TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                enable_link_shortener  INTEGER NOT NULL DEFAULT 0
            );

            -- Slugs of deleted posts; never handed out again.
            CREATE TABLE retired_slugs (
                slug        TEXT PRIMARY KEY,
                retired_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            "
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
