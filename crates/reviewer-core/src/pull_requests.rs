//! Pull request lifecycle: `OPEN --merge--> MERGED`, `OPEN --reassign--> OPEN`.
//!
//! Mutations follow a read, decide, write cycle. The write is a single
//! version-guarded replacement of the whole pull request, so a concurrent
//! writer makes it fail instead of being silently overwritten. On such a
//! conflict the cycle starts over from a fresh read.

use chrono::Utc;
use reviewer_types::{PrStatus, PullRequest, PullRequestDraft};
use tracing::{debug, info, warn};

use crate::errors::{DomainError, Result, require_id};
use crate::exclusion::ExclusionSet;
use crate::policy;
use crate::service::ReviewService;

/// Outcome of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub replaced_by: String,
    pub pull_request: PullRequest,
}

impl ReviewService {
    #[tracing::instrument(skip(self, draft), fields(pull_request_id = %draft.pull_request_id))]
    pub async fn create_pull_request(&self, draft: PullRequestDraft) -> Result<PullRequest> {
        require_id(&draft.pull_request_id, "pull request ID")?;

        if self.store.pull_request_exists(&draft.pull_request_id).await? {
            return Err(DomainError::PrExists);
        }

        let author = self
            .store
            .find_user(&draft.author_id)
            .await?
            .ok_or(DomainError::NotFound("author"))?;

        let exclude = ExclusionSet::for_author(&author.user_id);
        let candidates = self
            .membership()
            .eligible_candidates(&author.team_name, &exclude)
            .await?;
        let reviewers = policy::select_reviewers(&candidates);

        let pr = PullRequest {
            pull_request_id: draft.pull_request_id,
            pull_request_name: draft.pull_request_name,
            author_id: author.user_id,
            status: PrStatus::Open,
            assigned_reviewers: reviewers,
            created_at: Utc::now(),
            merged_at: None,
            version: 0,
        };

        // Another request may have taken the id since the existence check.
        if !self.store.create_pull_request(&pr).await? {
            return Err(DomainError::PrExists);
        }

        info!(
            "Pull request {} opened by {} with reviewers {:?}",
            pr.pull_request_id, pr.author_id, pr.assigned_reviewers
        );
        Ok(pr)
    }

    /// Marks the pull request merged. Merging an already merged pull request
    /// succeeds and leaves `merged_at` untouched.
    #[tracing::instrument(skip(self))]
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> Result<PullRequest> {
        require_id(pull_request_id, "pull request ID")?;

        for attempt in 1..=self.update_attempts {
            let mut pr = self.load_pull_request(pull_request_id).await?;
            if pr.is_merged() {
                debug!("Pull request {} already merged, nothing to do", pull_request_id);
                return Ok(pr);
            }

            pr.status = PrStatus::Merged;
            pr.merged_at = Some(Utc::now());

            if self.store.update_pull_request(&pr).await? {
                pr.version += 1;
                info!("Pull request {} merged", pull_request_id);
                return Ok(pr);
            }
            warn!(
                "Pull request {} changed while merging (attempt {}/{})",
                pull_request_id, attempt, self.update_attempts
            );
        }

        Err(DomainError::ConcurrentUpdate)
    }

    /// Replaces `old_reviewer_id` with a random eligible teammate of the old
    /// reviewer. The replacement takes the same slot.
    #[tracing::instrument(skip(self))]
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment> {
        require_id(pull_request_id, "pull request ID")?;
        require_id(old_reviewer_id, "old reviewer ID")?;

        for attempt in 1..=self.update_attempts {
            let mut pr = self.load_pull_request(pull_request_id).await?;
            if pr.is_merged() {
                return Err(DomainError::PrMerged);
            }

            let position = pr
                .reviewer_position(old_reviewer_id)
                .ok_or(DomainError::NotAssigned)?;

            let old_reviewer = self
                .store
                .find_user(old_reviewer_id)
                .await?
                .ok_or(DomainError::NotFound("old reviewer"))?;

            let exclude = ExclusionSet::for_reassignment(&pr, old_reviewer_id);
            let candidates = self
                .membership()
                .eligible_candidates(&old_reviewer.team_name, &exclude)
                .await?;
            let replaced_by = self.draw_replacement(&candidates)?;

            pr.assigned_reviewers[position] = replaced_by.clone();

            if self.store.update_pull_request(&pr).await? {
                pr.version += 1;
                info!(
                    "Pull request {}: reviewer {} replaced by {} in slot {}",
                    pull_request_id, old_reviewer_id, replaced_by, position
                );
                return Ok(Reassignment {
                    replaced_by,
                    pull_request: pr,
                });
            }
            warn!(
                "Pull request {} changed while reassigning (attempt {}/{})",
                pull_request_id, attempt, self.update_attempts
            );
        }

        Err(DomainError::ConcurrentUpdate)
    }

    pub async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest> {
        require_id(pull_request_id, "pull request ID")?;
        self.load_pull_request(pull_request_id).await
    }

    async fn load_pull_request(&self, pull_request_id: &str) -> Result<PullRequest> {
        self.store
            .find_pull_request(pull_request_id)
            .await?
            .ok_or(DomainError::NotFound("pull request"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::memory::InMemoryStore;
    use crate::testing::{InterferingStore, draft, members, service_with_team};

    use super::*;

    #[tokio::test]
    async fn test_create_picks_first_two_teammates() {
        let svc = service_with_team("backend", &[("a", true), ("b", true), ("c", true)]).await;

        let pr = svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b", "c"]);
        assert_eq!(pr.status, PrStatus::Open);
        assert!(pr.merged_at.is_none());

        let stored = svc.get_pull_request("pr-1").await.unwrap();
        assert_eq!(stored.assigned_reviewers, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_create_with_single_teammate() {
        let svc = service_with_team("backend", &[("a", true), ("b", true)]).await;

        let pr = svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b"]);
    }

    #[tokio::test]
    async fn test_create_solo_author_gets_no_reviewers() {
        let svc = service_with_team("solo", &[("a", true)]).await;

        let pr = svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        assert!(pr.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_create_skips_inactive_and_keeps_team_order() {
        let svc = service_with_team(
            "backend",
            &[("d", true), ("b", false), ("a", true), ("c", true)],
        )
        .await;

        let pr = svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["d", "c"]);
        assert!(!pr.assigned_reviewers.contains(&pr.author_id));
    }

    #[tokio::test]
    async fn test_create_ignores_other_teams() {
        let svc = service_with_team("backend", &[("a", true)]).await;
        svc.create_team("frontend", members(&[("x", true), ("y", true)]))
            .await
            .unwrap();

        let pr = svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        assert!(pr.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_create_validation_and_conflicts() {
        let svc = service_with_team("backend", &[("a", true), ("b", true)]).await;

        let err = svc.create_pull_request(draft("", "a")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = svc.create_pull_request(draft("pr-1", "ghost")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound("author")));

        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        let err = svc.create_pull_request(draft("pr-1", "b")).await.unwrap_err();
        assert!(matches!(err, DomainError::PrExists));
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let svc = service_with_team("backend", &[("a", true), ("b", true)]).await;
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();

        let first = svc.merge_pull_request("pr-1").await.unwrap();
        assert_eq!(first.status, PrStatus::Merged);
        let merged_at = first.merged_at.expect("merged_at stamped");

        let second = svc.merge_pull_request("pr-1").await.unwrap();
        assert_eq!(second.merged_at, Some(merged_at));
        assert_eq!(second.version, first.version);
    }

    #[tokio::test]
    async fn test_merge_errors() {
        let svc = service_with_team("backend", &[("a", true)]).await;

        assert!(matches!(
            svc.merge_pull_request("").await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            svc.merge_pull_request("missing").await.unwrap_err(),
            DomainError::NotFound("pull request")
        ));
    }

    #[tokio::test]
    async fn test_reassign_takes_same_slot() {
        let svc = service_with_team(
            "backend",
            &[("a", true), ("b", true), ("c", true), ("d", true)],
        )
        .await;
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();

        let outcome = svc.reassign_reviewer("pr-1", "b").await.unwrap();
        assert_eq!(outcome.replaced_by, "d");
        assert_eq!(outcome.pull_request.assigned_reviewers, vec!["d", "c"]);

        let outcome = svc.reassign_reviewer("pr-1", "c").await.unwrap();
        assert_eq!(outcome.replaced_by, "b");
        assert_eq!(outcome.pull_request.assigned_reviewers, vec!["d", "b"]);
    }

    #[tokio::test]
    async fn test_reassign_without_alternative() {
        let svc = service_with_team("backend", &[("a", true), ("b", true)]).await;
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();

        let err = svc.reassign_reviewer("pr-1", "b").await.unwrap_err();
        assert!(matches!(err, DomainError::NoCandidate));

        let pr = svc.get_pull_request("pr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b"]);
    }

    #[tokio::test]
    async fn test_reassign_skips_inactive_teammates() {
        let svc = service_with_team(
            "backend",
            &[("a", true), ("b", true), ("c", true), ("d", true)],
        )
        .await;
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        svc.set_user_active("d", false).await.unwrap();

        let err = svc.reassign_reviewer("pr-1", "b").await.unwrap_err();
        assert!(matches!(err, DomainError::NoCandidate));
    }

    #[tokio::test]
    async fn test_inactive_reviewer_stays_assigned_until_reassigned() {
        let svc = service_with_team(
            "backend",
            &[("a", true), ("b", true), ("c", true), ("d", true)],
        )
        .await;
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        svc.set_user_active("b", false).await.unwrap();

        let pr = svc.get_pull_request("pr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b", "c"]);

        let outcome = svc.reassign_reviewer("pr-1", "b").await.unwrap();
        assert_eq!(outcome.pull_request.assigned_reviewers, vec!["d", "c"]);
    }

    #[tokio::test]
    async fn test_reassign_after_merge_is_locked() {
        let svc = service_with_team(
            "backend",
            &[("a", true), ("b", true), ("c", true), ("d", true)],
        )
        .await;
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();
        svc.merge_pull_request("pr-1").await.unwrap();

        let err = svc.reassign_reviewer("pr-1", "b").await.unwrap_err();
        assert!(matches!(err, DomainError::PrMerged));

        let pr = svc.get_pull_request("pr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_reassign_errors() {
        let svc = service_with_team(
            "backend",
            &[("a", true), ("b", true), ("c", true), ("d", true)],
        )
        .await;
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();

        assert!(matches!(
            svc.reassign_reviewer("", "b").await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            svc.reassign_reviewer("pr-1", "").await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            svc.reassign_reviewer("missing", "b").await.unwrap_err(),
            DomainError::NotFound("pull request")
        ));
        assert!(matches!(
            svc.reassign_reviewer("pr-1", "d").await.unwrap_err(),
            DomainError::NotAssigned
        ));
        assert!(matches!(
            svc.reassign_reviewer("pr-1", "a").await.unwrap_err(),
            DomainError::NotAssigned
        ));
    }

    #[tokio::test]
    async fn test_reassign_uses_old_reviewers_team() {
        let store = Arc::new(InMemoryStore::new());
        let svc = ReviewService::new(store.clone());
        svc.create_team("backend", members(&[("a", true), ("b", true)]))
            .await
            .unwrap();
        svc.create_team("frontend", members(&[("x", true), ("y", true)]))
            .await
            .unwrap();

        // Seed a pull request whose reviewer belongs to another team.
        let pr = PullRequest {
            pull_request_id: "pr-x".into(),
            pull_request_name: "cross team".into(),
            author_id: "a".into(),
            status: PrStatus::Open,
            assigned_reviewers: vec!["x".into()],
            created_at: Utc::now(),
            merged_at: None,
            version: 0,
        };
        assert!(crate::store::PullRequestStore::create_pull_request(store.as_ref(), &pr)
            .await
            .unwrap());

        let outcome = svc.reassign_reviewer("pr-x", "x").await.unwrap();
        assert_eq!(outcome.replaced_by, "y");
    }

    #[tokio::test]
    async fn test_reassign_draws_vary() {
        let mut seen = HashSet::new();
        for round in 0..40 {
            let svc = service_with_team(
                "backend",
                &[("a", true), ("b", true), ("c", true), ("d", true), ("e", true), ("f", true)],
            )
            .await;
            let id = format!("pr-{}", round);
            svc.create_pull_request(draft(&id, "a")).await.unwrap();

            let outcome = svc.reassign_reviewer(&id, "b").await.unwrap();
            assert!(["d", "e", "f"].contains(&outcome.replaced_by.as_str()));
            assert_eq!(outcome.pull_request.assigned_reviewers[1], "c");
            seen.insert(outcome.replaced_by);
        }
        assert!(seen.len() > 1);
    }

    #[tokio::test]
    async fn test_reassign_rereads_after_concurrent_write() {
        let inner = Arc::new(InMemoryStore::new());
        let store = Arc::new(InterferingStore::new(inner.clone(), 1));
        let svc = ReviewService::new(store.clone());
        svc.create_team(
            "backend",
            members(&[("a", true), ("b", true), ("c", true), ("d", true)]),
        )
        .await
        .unwrap();
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();

        // The interfering writer swaps b for d just before our first write.
        let err = svc.reassign_reviewer("pr-1", "b").await.unwrap_err();
        assert!(matches!(err, DomainError::NotAssigned));

        let pr = svc.get_pull_request("pr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["d", "c"]);
    }

    #[tokio::test]
    async fn test_merge_succeeds_after_one_conflict() {
        let inner = Arc::new(InMemoryStore::new());
        let store = Arc::new(InterferingStore::new(inner, 1));
        let svc = ReviewService::new(store);
        svc.create_team(
            "backend",
            members(&[("a", true), ("b", true), ("c", true), ("d", true)]),
        )
        .await
        .unwrap();
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();

        // First write loses to the competing swap; the second lands on top of it.
        let pr = svc.merge_pull_request("pr-1").await.unwrap();
        assert_eq!(pr.status, PrStatus::Merged);
        assert_eq!(pr.assigned_reviewers, vec!["d", "c"]);
        assert_eq!(pr.version, 2);

        let stored = svc.get_pull_request("pr-1").await.unwrap();
        assert_eq!(stored.status, PrStatus::Merged);
        assert_eq!(stored.assigned_reviewers, vec!["d", "c"]);
        assert_eq!(stored.merged_at, pr.merged_at);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_merge_gives_up_after_repeated_conflicts() {
        let inner = Arc::new(InMemoryStore::new());
        let store = Arc::new(InterferingStore::new(inner, u32::MAX));
        let svc = ReviewService::new(store).with_update_attempts(2);
        svc.create_team("backend", members(&[("a", true), ("b", true)]))
            .await
            .unwrap();
        svc.create_pull_request(draft("pr-1", "a")).await.unwrap();

        let err = svc.merge_pull_request("pr-1").await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrentUpdate));
    }
}
