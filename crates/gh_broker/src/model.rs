use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use http::{header, HeaderMap, Request};

#[derive(Clone)]
pub struct GithubToken {
    pub secret: String,
}

impl GithubToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for GithubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubToken")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A validated GET/POST against the API, replayable across retry attempts.
#[derive(Debug)]
pub struct GithubRequest {
    inner: Request<Vec<u8>>,
    key: String,
}

impl GithubRequest {
    pub fn new(inner: Request<Vec<u8>>) -> anyhow::Result<Self> {
        if !inner.headers().contains_key(header::USER_AGENT) {
            return Err(anyhow::anyhow!("user-agent header required"));
        }

        let key = format!(
            "{} {}{}",
            inner.method(),
            inner.uri().path(),
            inner
                .uri()
                .query()
                .map(|q| format!("?{}", q))
                .unwrap_or_default()
        );

        Ok(Self { inner, key })
    }

    /// Builds a fresh copy of the request for one attempt.
    pub fn request(&self) -> anyhow::Result<Request<Vec<u8>>> {
        let mut builder = Request::builder()
            .method(self.inner.method().clone())
            .uri(self.inner.uri().clone())
            .version(self.inner.version());

        for (key, value) in self.inner.headers().iter() {
            builder = builder.header(key, value);
        }

        Ok(builder.body(self.inner.body().clone())?)
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    /// `METHOD /path?query`, used for logs and error messages.
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitUpdate {
    pub limit: i64,
    pub remaining: i64,
    pub reset: DateTime<Utc>,
}

pub fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimitUpdate> {
    let limit = headers
        .get("x-ratelimit-limit")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())?;
    let remaining = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())?;
    let reset_ts = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())?;
    let reset = DateTime::from_timestamp(reset_ts, 0)?;
    Some(RateLimitUpdate {
        limit,
        remaining,
        reset,
    })
}

#[derive(Debug, Clone)]
pub struct RetryAdvice {
    pub wait: Duration,
}

pub fn parse_retry_after(headers: &HeaderMap) -> Option<RetryAdvice> {
    let value = headers.get(header::RETRY_AFTER)?.to_str().ok()?;
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Some(RetryAdvice {
            wait: Duration::from_secs(seconds),
        });
    }
    let date = httpdate::parse_http_date(value).ok()?;
    let wait = date.duration_since(std::time::SystemTime::now()).ok()?;
    Some(RetryAdvice { wait })
}
