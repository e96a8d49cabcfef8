use crate::Database;
use crate::models::{PullRequestRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "user_id, username, team_name, is_active, position";

const PULL_REQUEST_COLUMNS: &str = "pull_request_id, pull_request_name, author_id, status, \
     assigned_reviewers, created_at, merged_at, version";

impl Database {
    // -- Teams --

    pub fn team_exists(&self, team_name: &str) -> Result<bool> {
        self.with_conn(|conn| query_team_exists(conn, team_name))
    }

    /// Inserts the team and its members in one transaction.
    /// Returns false, writing nothing, when the team name is taken.
    pub fn insert_team(&self, team_name: &str, members: &[UserRow]) -> Result<bool> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO teams (team_name) VALUES (?1)",
                [team_name],
            )?;
            if inserted == 0 {
                return Ok(false);
            }

            for member in members {
                tx.execute(
                    "INSERT INTO users (user_id, username, team_name, is_active, position)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        member.user_id,
                        member.username,
                        team_name,
                        member.is_active,
                        member.position
                    ],
                )?;
            }

            tx.commit()?;
            Ok(true)
        })
    }

    pub fn get_team_members(&self, team_name: &str) -> Result<Option<Vec<UserRow>>> {
        self.with_conn(|conn| {
            if !query_team_exists(conn, team_name)? {
                return Ok(None);
            }
            let sql = format!(
                "SELECT {} FROM users WHERE team_name = ?1 ORDER BY position",
                USER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([team_name], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Some(rows))
        })
    }

    // -- Users --

    pub fn get_user(&self, user_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, user_id))
    }

    pub fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET is_active = ?2 WHERE user_id = ?1",
                rusqlite::params![user_id, is_active],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_user(conn, user_id)
        })
    }

    /// Active members of a team in insertion order, minus `exclude`.
    pub fn get_active_team_members(
        &self,
        team_name: &str,
        exclude: &[&str],
    ) -> Result<Vec<UserRow>> {
        let exclude_json = serde_json::to_string(exclude)?;

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users
                 WHERE team_name = ?1
                   AND is_active = 1
                   AND user_id NOT IN (SELECT value FROM json_each(?2))
                 ORDER BY position",
                USER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![team_name, exclude_json], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Pull requests --

    pub fn pull_request_exists(&self, pull_request_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM pull_requests WHERE pull_request_id = ?1",
                [pull_request_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn get_pull_request(&self, pull_request_id: &str) -> Result<Option<PullRequestRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM pull_requests WHERE pull_request_id = ?1",
                PULL_REQUEST_COLUMNS
            );
            conn.query_row(&sql, [pull_request_id], pull_request_from_row)
                .optional()
        })
    }

    /// Returns false when the id is already taken.
    pub fn insert_pull_request(&self, pr: &PullRequestRow) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO pull_requests
                    (pull_request_id, pull_request_name, author_id, status,
                     assigned_reviewers, created_at, merged_at, version)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    pr.pull_request_id,
                    pr.pull_request_name,
                    pr.author_id,
                    pr.status,
                    pr.assigned_reviewers,
                    pr.created_at,
                    pr.merged_at,
                    pr.version
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    /// Replaces the row if its version still equals `pr.version`, bumping it.
    pub fn update_pull_request(&self, pr: &PullRequestRow) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE pull_requests
                 SET pull_request_name = ?2,
                     author_id = ?3,
                     status = ?4,
                     assigned_reviewers = ?5,
                     created_at = ?6,
                     merged_at = ?7,
                     version = version + 1
                 WHERE pull_request_id = ?1 AND version = ?8",
                rusqlite::params![
                    pr.pull_request_id,
                    pr.pull_request_name,
                    pr.author_id,
                    pr.status,
                    pr.assigned_reviewers,
                    pr.created_at,
                    pr.merged_at,
                    pr.version
                ],
            )?;
            Ok(updated == 1)
        })
    }

    pub fn get_pull_requests_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM pull_requests p
                 WHERE EXISTS (
                     SELECT 1 FROM json_each(p.assigned_reviewers) WHERE value = ?1
                 )
                 ORDER BY p.rowid",
                PULL_REQUEST_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], pull_request_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_team_exists(conn: &Connection, team_name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM teams WHERE team_name = ?1",
        [team_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn query_user(conn: &Connection, user_id: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS);
    conn.query_row(&sql, [user_id], user_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        user_id: row.get(0)?,
        username: row.get(1)?,
        team_name: row.get(2)?,
        is_active: row.get(3)?,
        position: row.get(4)?,
    })
}

fn pull_request_from_row(row: &Row<'_>) -> rusqlite::Result<PullRequestRow> {
    Ok(PullRequestRow {
        pull_request_id: row.get(0)?,
        pull_request_name: row.get(1)?,
        author_id: row.get(2)?,
        status: row.get(3)?,
        assigned_reviewers: row.get(4)?,
        created_at: row.get(5)?,
        merged_at: row.get(6)?,
        version: row.get(7)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
