use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Item of `GET /user/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoPayload {
    pub name: String,
    pub owner: UserRef,
    #[serde(default)]
    pub stargazers_count: u64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub login: String,
}

/// Item of `GET /repos/{owner}/{repo}/stats/contributors`. `author` is null
/// for commits attributed to deleted accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorStatsPayload {
    pub author: Option<UserRef>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub weeks: Vec<WeekPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeekPayload {
    /// Week start, unix seconds.
    pub w: i64,
    #[serde(default)]
    pub a: u64,
    #[serde(default)]
    pub d: u64,
    /// Commits that week.
    #[serde(default)]
    pub c: u64,
}

/// Item of `GET /repos/{owner}/{repo}/stats/commit_activity`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitActivityWeek {
    #[serde(default)]
    pub days: Vec<u64>,
    pub total: u64,
    pub week: i64,
}
