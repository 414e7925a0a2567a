use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use http::{header, HeaderValue, Request, Response, StatusCode};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::backoff::BackoffPolicy;
use crate::error::HttpStatusError;
use crate::metrics;
use crate::model::{parse_rate_limit, parse_retry_after, GithubRequest, GithubToken};

#[async_trait]
pub trait HttpExec: Send + Sync {
    async fn execute(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("building reqwest client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpExec for ReqwestExecutor {
    async fn execute(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let (parts, body) = req.into_parts();
        let mut builder = self.client.request(parts.method, parts.uri.to_string());
        builder = builder.headers(parts.headers);
        let resp = builder.body(body).send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await?;
        let mut response = Response::new(bytes.to_vec());
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Executes authenticated GitHub requests. Non-success statuses surface as
/// [`HttpStatusError`] after the retry budget is spent.
pub trait GithubBroker: Send + Sync {
    fn enqueue(
        &self,
        request: Request<Vec<u8>>,
    ) -> BoxFuture<'static, Result<Response<Vec<u8>>>>;
}

#[derive(Clone)]
pub struct GithubBrokerBuilder {
    token: GithubToken,
    user_agent: String,
    http_exec: Option<Arc<dyn HttpExec>>,
    max_inflight: usize,
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl GithubBrokerBuilder {
    pub fn new(token: GithubToken) -> Self {
        Self {
            token,
            user_agent: "readme v1.0.0".to_string(),
            http_exec: None,
            max_inflight: 8,
            max_attempts: 5,
            backoff: BackoffPolicy::default(),
        }
    }

    pub fn http_exec(mut self, exec: Arc<dyn HttpExec>) -> Self {
        self.http_exec = Some(exec);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn max_inflight(mut self, max: usize) -> Self {
        self.max_inflight = max;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn backoff(mut self, base: Duration, max: Duration, jitter: f32) -> Self {
        self.backoff = BackoffPolicy {
            base,
            max,
            jitter_frac: jitter,
        };
        self
    }

    pub fn build(self) -> Result<Arc<dyn GithubBroker>> {
        let exec = match self.http_exec {
            Some(exec) => exec,
            None => Arc::new(ReqwestExecutor::new(&self.user_agent)?),
        };

        let inner = Arc::new(Inner {
            http_exec: exec,
            token: self.token,
            inflight: Semaphore::new(self.max_inflight.max(1)),
            max_attempts: self.max_attempts.max(1),
            backoff: self.backoff,
        });

        Ok(Arc::new(LocalGithubBroker { inner }))
    }
}

struct Inner {
    http_exec: Arc<dyn HttpExec>,
    token: GithubToken,
    inflight: Semaphore,
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl Inner {
    async fn process(&self, request: GithubRequest) -> Result<Response<Vec<u8>>> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match self.execute_once(&request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let (retryable, advised, reason) = match err.downcast_ref::<HttpStatusError>() {
                Some(status_err) => (
                    status_err.is_retryable(),
                    status_err.retry_after,
                    retry_reason(status_err.status),
                ),
                None => (true, None, "transport"),
            };

            if !retryable || attempt >= self.max_attempts {
                return Err(err);
            }

            let wait = match advised {
                Some(advised) => advised.min(self.backoff.max),
                None => self.backoff.delay(attempt - 1),
            };
            if reason == "stats_pending" {
                debug!(
                    attempt,
                    request = %request.key(),
                    wait_ms = wait.as_millis() as u64,
                    "GitHub is still computing statistics"
                );
            } else {
                warn!(
                    attempt,
                    request = %request.key(),
                    error = %err,
                    wait_ms = wait.as_millis() as u64,
                    "GitHub request attempt failed"
                );
            }
            metrics::RETRIES_TOTAL.with_label_values(&[reason]).inc();
            metrics::SLEEP_SECONDS
                .with_label_values(&[reason])
                .inc_by(wait.as_secs());
            sleep(wait).await;
        }
    }

    async fn execute_once(&self, request: &GithubRequest) -> Result<Response<Vec<u8>>> {
        let outgoing = request.request()?;
        let _permit = self.inflight.acquire().await?;

        let start = Instant::now();
        let response = {
            let _inflight = InflightGuard::enter();
            self.http_exec.execute(outgoing).await
        };

        let response = response?;
        metrics::LATENCY.observe(start.elapsed().as_secs_f64());
        let status = response.status();
        metrics::REQUESTS_TOTAL
            .with_label_values(&[status_class(status)])
            .inc();

        if status.is_success() && status != StatusCode::ACCEPTED {
            return Ok(response);
        }

        let headers = response.headers();
        let retry = parse_retry_after(headers);
        if status != StatusCode::ACCEPTED {
            let rate_info = parse_rate_limit(headers);
            warn!(
                status = %status,
                request = %request.key(),
                github_request_id = headers
                    .get("x-github-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-"),
                retry_after_seconds = retry.as_ref().map(|r| r.wait.as_secs()),
                rate_limit_remaining = rate_info.as_ref().map(|data| data.remaining),
                rate_limit_reset = rate_info.as_ref().map(|data| data.reset.timestamp()),
                body_preview = %body_preview(response.body()),
                "GitHub returned error response"
            );
        }

        Err(HttpStatusError::with_endpoint(status, request.key())
            .retry_after(retry.map(|advice| advice.wait))
            .into())
    }
}

/// Holds one unit of the in-flight gauge; released even when the request
/// future is dropped mid-flight.
struct InflightGuard;

impl InflightGuard {
    fn enter() -> Self {
        metrics::INFLIGHT.inc();
        Self
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        metrics::INFLIGHT.dec();
    }
}

#[derive(Clone)]
pub struct LocalGithubBroker {
    inner: Arc<Inner>,
}

impl GithubBroker for LocalGithubBroker {
    fn enqueue(
        &self,
        request: Request<Vec<u8>>,
    ) -> BoxFuture<'static, Result<Response<Vec<u8>>>> {
        let inner = self.inner.clone();
        async move {
            let mut gh_req = GithubRequest::new(request)?;
            let mut auth = HeaderValue::from_str(&format!("Bearer {}", inner.token.secret))?;
            auth.set_sensitive(true);
            gh_req.headers_mut().insert(header::AUTHORIZATION, auth);
            inner.process(gh_req).await
        }
        .boxed()
    }
}

fn retry_reason(status: StatusCode) -> &'static str {
    match status {
        StatusCode::ACCEPTED => "stats_pending",
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => "rate_limited",
        _ => "server_error",
    }
}

fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }
    let text = String::from_utf8_lossy(body);
    truncate_str(&text, 256)
}

fn truncate_str(value: &str, limit: usize) -> String {
    let mut truncated: String = value.chars().take(limit).collect();
    if truncated.len() < value.len() {
        truncated.push('…');
    }
    truncated
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}
