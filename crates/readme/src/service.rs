use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::config::{AppConfig, CutoffClock};
use common::{AppError, Result};
use gh_broker::HttpStatusError;
use http::StatusCode;
use stats::{resolve_cutoff, sum_stars, CommitWindow};
use tracing::{info, instrument};

use crate::aggregator::CommitAggregator;
use crate::client::{GithubApiError, GithubClient};
use crate::lister::RepositoryLister;
use crate::metrics;
use crate::render::{ReadmeData, Renderer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub repositories: usize,
    pub total_stars: u64,
    pub total_commits: u64,
    pub cutoff: Option<DateTime<Utc>>,
}

/// List, aggregate, render. Output is written only once every statistic
/// has been computed.
pub struct ReadmeService<C: GithubClient + ?Sized> {
    lister: RepositoryLister<C>,
    aggregator: CommitAggregator<C>,
    renderer: Renderer,
    window: CommitWindow,
    clock: CutoffClock,
    colors: Vec<String>,
}

impl<C: GithubClient + ?Sized> ReadmeService<C> {
    pub fn new(config: &AppConfig, client: Arc<C>) -> Result<Self> {
        let login = config.github.resolved_username()?.to_string();
        let window: CommitWindow = config.commits.window.parse()?;

        Ok(Self {
            lister: RepositoryLister::new(client.clone(), config.github.page_size),
            aggregator: CommitAggregator::new(client, login, config.commits.source),
            renderer: Renderer::from_config(&config.render),
            window,
            clock: config.commits.clock,
            colors: config.render.colors.clone(),
        })
    }

    pub async fn run_once(&self) -> Result<RunSummary> {
        self.run_at(Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        metrics::LAST_RUN_TIMESTAMP.set(now.timestamp());
        let _timer = metrics::RUN_DURATION.start_timer();

        let cutoff = resolve_cutoff(self.window, self.clock, now);

        let repositories = self.lister.list().await.map_err(classify)?;
        metrics::REPOSITORIES_LISTED.set(repositories.len() as i64);

        let total_stars = sum_stars(&repositories);
        let total_commits = self
            .aggregator
            .sum_commits_since(&repositories, cutoff)
            .await
            .map_err(classify)?;
        metrics::TOTAL_STARS.set(total_stars as i64);
        metrics::TOTAL_COMMITS.set(total_commits as i64);

        self.renderer.render(&ReadmeData::new(
            total_stars,
            total_commits,
            self.colors.clone(),
        ))?;
        metrics::LAST_SUCCESS_TIMESTAMP.set(Utc::now().timestamp());

        let summary = RunSummary {
            repositories: repositories.len(),
            total_stars,
            total_commits,
            cutoff,
        };
        info!(
            repositories = summary.repositories,
            total_stars,
            total_commits,
            cutoff = ?cutoff,
            output = %self.renderer.output_path().display(),
            "statistics written"
        );
        Ok(summary)
    }
}

/// Maps a GitHub call failure onto the application taxonomy; a 401 anywhere
/// in the chain means the token was rejected.
pub fn classify(err: anyhow::Error) -> AppError {
    let top = err
        .downcast_ref::<GithubApiError>()
        .map(GithubApiError::status_code);
    let unauthorized = top == Some(StatusCode::UNAUTHORIZED)
        || err.chain().any(|cause| {
            cause
                .downcast_ref::<GithubApiError>()
                .map(GithubApiError::status_code)
                .or_else(|| cause.downcast_ref::<HttpStatusError>().map(|e| e.status))
                == Some(StatusCode::UNAUTHORIZED)
        });
    if unauthorized {
        AppError::Unauthorized(err)
    } else {
        AppError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn unauthorized_behind_context_is_auth() {
        let err = Err::<(), _>(anyhow::Error::from(GithubApiError::status(
            StatusCode::UNAUTHORIZED,
            "user/repos",
        )))
        .context("listing repositories")
        .unwrap_err();
        assert!(classify(err).is_auth());
    }

    #[test]
    fn other_failures_are_http() {
        let err = anyhow::Error::from(GithubApiError::status(
            StatusCode::NOT_FOUND,
            "repos/o/r/stats/contributors",
        ));
        assert!(matches!(classify(err), AppError::Http(_)));
    }
}
