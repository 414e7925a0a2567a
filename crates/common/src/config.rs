use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::errors::AppError;

/// Variables read by the original scripts; they seed `github.*` when nothing
/// else sets those keys.
const LEGACY_ENV: [(&str, &str); 2] = [
    ("github.token", "GH_ACCESS_TOKEN"),
    ("github.username", "GH_USERNAME"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub commits: CommitsConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        for (key, var) in LEGACY_ENV {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_default(key, value)?;
            }
        }

        let cfg: Self = builder
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "GithubConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "GithubConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "GithubConfig::default_page_size")]
    pub page_size: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            username: None,
            user_agent: Self::default_user_agent(),
            base_url: Self::default_base_url(),
            page_size: Self::default_page_size(),
        }
    }
}

impl GithubConfig {
    fn default_user_agent() -> String {
        "readme v1.0.0".to_string()
    }

    fn default_base_url() -> String {
        "https://api.github.com/".to_string()
    }

    const fn default_page_size() -> u32 {
        100
    }

    pub fn resolved_token(&self) -> Result<&str, AppError> {
        non_empty(self.token.as_deref())
            .ok_or(AppError::Auth("no GitHub token configured (GH_ACCESS_TOKEN)"))
    }

    pub fn resolved_username(&self) -> Result<&str, AppError> {
        non_empty(self.username.as_deref())
            .ok_or(AppError::Auth("no GitHub username configured (GH_USERNAME)"))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Endpoint the commit aggregator reads weekly activity from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitSource {
    /// `stats/contributors`: per-author weekly history, filtered locally.
    #[default]
    Contributors,
    /// `stats/commit_activity`: repository-wide weekly totals, already
    /// limited to the last year by GitHub.
    CommitActivity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutoffClock {
    #[default]
    Utc,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitsConfig {
    #[serde(default)]
    pub source: CommitSource,
    /// `last_year`, `all`, or an RFC 3339 timestamp / `YYYY-MM-DD` date.
    #[serde(default = "CommitsConfig::default_window")]
    pub window: String,
    #[serde(default)]
    pub clock: CutoffClock,
}

impl Default for CommitsConfig {
    fn default() -> Self {
        Self {
            source: CommitSource::default(),
            window: Self::default_window(),
            clock: CutoffClock::default(),
        }
    }
}

impl CommitsConfig {
    fn default_window() -> String {
        "last_year".to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "BrokerConfig::default_max_inflight")]
    pub max_inflight: usize,
    #[serde(default = "BrokerConfig::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "BrokerConfig::default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "BrokerConfig::default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    #[serde(default = "BrokerConfig::default_jitter_frac")]
    pub jitter_frac: f32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_inflight: Self::default_max_inflight(),
            max_attempts: Self::default_max_attempts(),
            backoff_base_ms: Self::default_backoff_base_ms(),
            backoff_max_ms: Self::default_backoff_max_ms(),
            jitter_frac: Self::default_jitter_frac(),
        }
    }
}

impl BrokerConfig {
    const fn default_max_inflight() -> usize {
        8
    }

    const fn default_max_attempts() -> u32 {
        5
    }

    const fn default_backoff_base_ms() -> u64 {
        500
    }

    const fn default_backoff_max_ms() -> u64 {
        30_000
    }

    const fn default_jitter_frac() -> f32 {
        0.2
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "RenderConfig::default_template_path")]
    pub template_path: String,
    #[serde(default = "RenderConfig::default_output_path")]
    pub output_path: String,
    #[serde(default = "RenderConfig::default_colors")]
    pub colors: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_path: Self::default_template_path(),
            output_path: Self::default_output_path(),
            colors: Self::default_colors(),
        }
    }
}

impl RenderConfig {
    fn default_template_path() -> String {
        "./main.mustache".to_string()
    }

    fn default_output_path() -> String {
        "README.md".to_string()
    }

    fn default_colors() -> Vec<String> {
        ["474342", "fbedf6", "c9594d", "f8b9b2", "ae9c9d"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "ObservabilityConfig::default_log_level")]
    pub log_level: String,
    /// Prometheus textfile written after each run when set.
    #[serde(default)]
    pub metrics_file: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            metrics_file: None,
        }
    }
}

impl ObservabilityConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}
