//! Reviewer assignment engine.
//!
//! Decides which teammates review a pull request when it is opened, and who
//! takes over a reviewer slot on reassignment. Persistence is abstracted
//! behind the traits in [`store`].

pub mod errors;
pub mod exclusion;
pub mod membership;
pub mod memory;
pub mod policy;
pub mod pull_requests;
pub mod service;
pub mod store;
pub mod teams;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{DomainError, Result, StoreError, StoreResult};
pub use exclusion::ExclusionSet;
pub use memory::InMemoryStore;
pub use pull_requests::Reassignment;
pub use service::ReviewService;
pub use store::{PullRequestStore, Store, TeamStore, UserStore};
