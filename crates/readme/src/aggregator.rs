use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::config::CommitSource;
use futures::future::try_join_all;
use normalizer::{
    normalize_commit_activity, normalize_contributor, CommitActivityWeek,
    ContributorStatsPayload, Repository,
};
use serde_json::Value;
use stats::{repo_commits, select_repositories, RepoActivity};
use tracing::{debug, info, instrument};

use crate::client::GithubClient;
use crate::metrics;

/// Sums the account's commits over the repositories touched after the
/// cutoff. One statistics request per repository, all issued together and
/// joined all-or-nothing; the broker underneath bounds how many run at once.
pub struct CommitAggregator<C: GithubClient + ?Sized> {
    client: Arc<C>,
    login: String,
    source: CommitSource,
}

impl<C: GithubClient + ?Sized> CommitAggregator<C> {
    pub fn new(client: Arc<C>, login: impl Into<String>, source: CommitSource) -> Self {
        Self {
            client,
            login: login.into(),
            source,
        }
    }

    #[instrument(skip(self, repositories), fields(login = %self.login, source = ?self.source))]
    pub async fn sum_commits_since(
        &self,
        repositories: &[Repository],
        cutoff: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let selected = select_repositories(repositories, cutoff);
        info!(
            selected = selected.len(),
            listed = repositories.len(),
            cutoff = ?cutoff,
            "querying commit statistics"
        );

        let activities = try_join_all(selected.iter().map(|repo| self.fetch_activity(repo))).await?;

        let mut total = 0u64;
        for (repo, activity) in selected.iter().zip(&activities) {
            let commits = repo_commits(activity, &self.login, cutoff);
            debug!(owner = %repo.owner, repo = %repo.name, commits, "counted repository commits");
            total = total.saturating_add(commits);
        }
        Ok(total)
    }

    async fn fetch_activity(&self, repo: &Repository) -> Result<RepoActivity> {
        metrics::REPOS_QUERIED.inc();
        match self.source {
            CommitSource::Contributors => {
                let values = self
                    .client
                    .contributor_stats(&repo.owner, &repo.name)
                    .await
                    .with_context(|| {
                        format!("fetching contributor stats for {}/{}", repo.owner, repo.name)
                    })?;
                let mut contributors = Vec::with_capacity(values.len());
                for value in values {
                    let payload: ContributorStatsPayload = serde_json::from_value(value)
                        .context("decoding contributor stats payload")?;
                    contributors.push(normalize_contributor(&payload));
                }
                Ok(RepoActivity::Contributors(contributors))
            }
            CommitSource::CommitActivity => {
                let values = self
                    .client
                    .commit_activity(&repo.owner, &repo.name)
                    .await
                    .with_context(|| {
                        format!("fetching commit activity for {}/{}", repo.owner, repo.name)
                    })?;
                let weeks: Vec<CommitActivityWeek> = serde_json::from_value(Value::Array(values))
                    .context("decoding commit activity payload")?;
                Ok(RepoActivity::Weekly(normalize_commit_activity(&weeks)))
            }
        }
    }
}
