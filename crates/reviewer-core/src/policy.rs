//! Reviewer decision rules. Both functions are pure; callers source the
//! candidate list right before calling them.

use rand::Rng;
use rand::seq::IndexedRandom;
use reviewer_types::User;

use crate::errors::{DomainError, Result};

/// Reviewer slots per pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Picks reviewers for a new pull request: the first candidates in team
/// order, up to [`MAX_REVIEWERS`]. An empty candidate list is not an error.
pub fn select_reviewers(candidates: &[User]) -> Vec<String> {
    candidates
        .iter()
        .take(MAX_REVIEWERS)
        .map(|u| u.user_id.clone())
        .collect()
}

/// Draws one replacement reviewer uniformly at random.
pub fn pick_replacement<'a, R: Rng + ?Sized>(
    candidates: &'a [User],
    rng: &mut R,
) -> Result<&'a User> {
    candidates.choose(rng).ok_or(DomainError::NoCandidate)
}
