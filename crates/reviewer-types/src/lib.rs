pub mod api;
pub mod models;

pub use models::{NewTeamMember, PrStatus, PullRequest, PullRequestDraft, Team, User};
