//! Database row types. These map directly to SQLite rows.
//! Distinct from reviewer-types models to keep the DB layer independent.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reviewer_types::{PullRequest, User};

pub struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
    pub position: i64,
}

pub struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub assigned_reviewers: String,
    pub created_at: String,
    pub merged_at: Option<String>,
    pub version: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

impl PullRequestRow {
    pub fn from_domain(pr: &PullRequest) -> Result<Self> {
        Ok(Self {
            pull_request_id: pr.pull_request_id.clone(),
            pull_request_name: pr.pull_request_name.clone(),
            author_id: pr.author_id.clone(),
            status: pr.status.as_str().to_string(),
            assigned_reviewers: serde_json::to_string(&pr.assigned_reviewers)?,
            created_at: format_timestamp(&pr.created_at),
            merged_at: pr.merged_at.as_ref().map(format_timestamp),
            version: i64::try_from(pr.version)?,
        })
    }
}

impl TryFrom<PullRequestRow> for PullRequest {
    type Error = anyhow::Error;

    fn try_from(row: PullRequestRow) -> Result<Self> {
        let id = row.pull_request_id;
        Ok(PullRequest {
            status: row
                .status
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Corrupt status on '{}': {}", id, e))?,
            assigned_reviewers: serde_json::from_str(&row.assigned_reviewers)
                .with_context(|| format!("Corrupt assigned_reviewers on '{}'", id))?,
            created_at: parse_timestamp(&row.created_at)
                .with_context(|| format!("Corrupt created_at on '{}'", id))?,
            merged_at: row
                .merged_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()
                .with_context(|| format!("Corrupt merged_at on '{}'", id))?,
            version: u64::try_from(row.version)?,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            pull_request_id: id,
        })
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
