use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use reviewer_types::User;

use crate::errors::Result;
use crate::membership::TeamMembership;
use crate::policy;
use crate::store::Store;

pub const DEFAULT_UPDATE_ATTEMPTS: u32 = 3;

/// Entry point for every team, user and pull request operation.
///
/// Holds no request state of its own. The random source used for
/// reassignment is injected so that callers can seed it.
pub struct ReviewService {
    pub(crate) store: Arc<dyn Store>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    pub(crate) update_attempts: u32,
}

impl ReviewService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_rng(store, Box::new(StdRng::from_os_rng()))
    }

    pub fn with_rng(store: Arc<dyn Store>, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
            update_attempts: DEFAULT_UPDATE_ATTEMPTS,
        }
    }

    /// How many times a mutation re-reads and retries after losing a
    /// version race. Clamped to at least one.
    pub fn with_update_attempts(mut self, attempts: u32) -> Self {
        self.update_attempts = attempts.max(1);
        self
    }

    pub(crate) fn membership(&self) -> TeamMembership<'_, dyn Store> {
        TeamMembership::new(self.store.as_ref())
    }

    pub(crate) fn draw_replacement(&self, candidates: &[User]) -> Result<String> {
        // A panic mid-draw cannot leave the generator in a state worth refusing.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let chosen = policy::pick_replacement(candidates, &mut **rng)?;
        Ok(chosen.user_id.clone())
    }
}
