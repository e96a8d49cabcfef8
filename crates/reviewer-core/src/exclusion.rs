use std::collections::BTreeSet;

use reviewer_types::{PullRequest, User};

/// User ids that may not be picked as reviewers for a given decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusions when opening a pull request: only the author.
    pub fn for_author(author_id: &str) -> Self {
        let mut set = Self::new();
        set.insert(author_id);
        set
    }

    /// Exclusions when replacing `old_reviewer_id` on `pr`: the old reviewer,
    /// the author, and every other reviewer currently assigned.
    pub fn for_reassignment(pr: &PullRequest, old_reviewer_id: &str) -> Self {
        let mut set = Self::for_author(&pr.author_id);
        set.insert(old_reviewer_id);
        for reviewer in &pr.assigned_reviewers {
            set.insert(reviewer.as_str());
        }
        set
    }

    pub fn insert(&mut self, user_id: impl Into<String>) {
        self.ids.insert(user_id.into());
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.ids.contains(user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `user` is active and not excluded.
    pub fn admits(&self, user: &User) -> bool {
        user.is_active && !self.contains(&user.user_id)
    }
}
