use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use gh_broker::{GithubBroker, HttpStatusError};
use http::{header, Request, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum GithubApiError {
    #[error("github api error: {status} for {endpoint}")]
    Http {
        status: StatusCode,
        endpoint: String,
    },
}

impl GithubApiError {
    pub fn status(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match *self {
            GithubApiError::Http { status, .. } => status,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            GithubApiError::Http { endpoint, .. } => endpoint.as_str(),
        }
    }
}

/// The GitHub REST calls the statistics pipeline needs. Responses stay raw
/// JSON; callers deserialize into `normalizer` payloads.
#[async_trait]
pub trait GithubClient: Send + Sync {
    /// `GET /user/repos` for the authenticated account, one page.
    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Vec<Value>>;

    /// `GET /repos/{owner}/{repo}/stats/contributors`.
    async fn contributor_stats(&self, owner: &str, repo: &str) -> Result<Vec<Value>>;

    /// `GET /repos/{owner}/{repo}/stats/commit_activity`.
    async fn commit_activity(&self, owner: &str, repo: &str) -> Result<Vec<Value>>;
}

pub struct BrokerGithubClient {
    broker: Arc<dyn GithubBroker>,
    base: Url,
    user_agent: String,
}

impl BrokerGithubClient {
    pub fn new(broker: Arc<dyn GithubBroker>, user_agent: String, base_url: &str) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            broker,
            base: Url::parse(&base)?,
            user_agent,
        })
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        debug!(endpoint = %endpoint, url = %url, "Dispatching GitHub request");
        let response = match self.execute(url).await {
            Ok(resp) => resp,
            Err(err) => {
                if let Some(status_err) = err.downcast_ref::<HttpStatusError>() {
                    return Err(GithubApiError::status(status_err.status, endpoint).into());
                }
                return Err(err);
            }
        };
        let status = response.status();
        if !status.is_success() {
            return Err(GithubApiError::status(status, endpoint).into());
        }
        let body = response.into_body();
        if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_json_array(&self, url: Url) -> Result<Vec<Value>> {
        let value = self.get_json(url).await?;
        match value {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            // Statistics endpoints answer `{}` for repositories without history.
            Value::Object(map) if map.is_empty() => Ok(Vec::new()),
            _ => Err(anyhow!("expected array response")),
        }
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn execute(&self, url: Url) -> Result<http::Response<Vec<u8>>> {
        let uri: http::Uri = url.as_str().parse()?;
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::USER_AGENT, self.user_agent.clone())
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .body(Vec::new())?;

        self.broker.enqueue(request).await
    }

    fn join(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn repo_url(&self, owner: &str, repo: &str, tail: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["repos", owner, repo, "stats", tail]);
        Ok(url)
    }

    fn with_query(url: &mut Url, params: &[(&str, String)]) {
        let mut query_pairs = url.query_pairs_mut();
        for (key, val) in params {
            query_pairs.append_pair(key, val);
        }
    }
}

#[async_trait]
impl GithubClient for BrokerGithubClient {
    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Vec<Value>> {
        let mut url = self.join("user/repos")?;
        let params = [
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        Self::with_query(&mut url, &params);
        self.get_json_array(url).await
    }

    async fn contributor_stats(&self, owner: &str, repo: &str) -> Result<Vec<Value>> {
        let url = self.repo_url(owner, repo, "contributors")?;
        self.get_json_array(url).await
    }

    async fn commit_activity(&self, owner: &str, repo: &str) -> Result<Vec<Value>> {
        let url = self.repo_url(owner, repo, "commit_activity")?;
        self.get_json_array(url).await
    }
}
