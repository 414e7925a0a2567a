use std::sync::Arc;

use anyhow::{Context, Result};
use normalizer::{normalize_repo, RepoPayload, Repository};
use tracing::{info, instrument};

use crate::client::GithubClient;

/// Lists the authenticated account's repositories. Only the first page is
/// read, so accounts with more than `per_page` repositories are truncated.
pub struct RepositoryLister<C: GithubClient + ?Sized> {
    client: Arc<C>,
    per_page: u32,
}

impl<C: GithubClient + ?Sized> RepositoryLister<C> {
    pub fn new(client: Arc<C>, per_page: u32) -> Self {
        Self {
            client,
            per_page: per_page.clamp(1, 100),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Repository>> {
        let values = self
            .client
            .list_repositories(1, self.per_page)
            .await
            .context("listing repositories")?;

        let mut repositories = Vec::with_capacity(values.len());
        for value in values {
            let payload: RepoPayload =
                serde_json::from_value(value).context("decoding repository payload")?;
            repositories.push(normalize_repo(&payload));
        }

        if repositories.len() == self.per_page as usize {
            info!(
                per_page = self.per_page,
                "repository list filled the page; later pages are not fetched"
            );
        }
        Ok(repositories)
    }
}
