pub mod models;
pub mod payloads;
pub mod transform;

pub use models::{ContributorActivity, Repository, WeekEntry};
pub use payloads::{CommitActivityWeek, ContributorStatsPayload, RepoPayload, UserRef, WeekPayload};
pub use transform::{normalize_commit_activity, normalize_contributor, normalize_repo};
