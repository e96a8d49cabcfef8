use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE teams (
                team_name   TEXT PRIMARY KEY,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE users (
                user_id     TEXT PRIMARY KEY,
                username    TEXT NOT NULL,
                team_name   TEXT NOT NULL REFERENCES teams(team_name),
                is_active   INTEGER NOT NULL DEFAULT 1,
                position    INTEGER NOT NULL
            );

            CREATE INDEX idx_users_team
                ON users(team_name, position);

            -- assigned_reviewers holds a JSON array of user ids
            CREATE TABLE pull_requests (
                pull_request_id     TEXT PRIMARY KEY,
                pull_request_name   TEXT NOT NULL,
                author_id           TEXT NOT NULL REFERENCES users(user_id),
                status              TEXT NOT NULL DEFAULT 'OPEN',
                assigned_reviewers  TEXT NOT NULL DEFAULT '[]',
                created_at          TEXT NOT NULL,
                merged_at           TEXT,
                version             INTEGER NOT NULL DEFAULT 0
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
