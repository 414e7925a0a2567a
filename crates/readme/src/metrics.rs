use std::path::Path;

use common::AppError;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Encoder, Histogram, IntCounter,
    IntGauge, TextEncoder,
};

pub static LAST_RUN_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "readme_last_run_timestamp_seconds",
        "Unix timestamp when the statistics run started"
    )
    .expect("readme last run timestamp")
});

pub static LAST_SUCCESS_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "readme_last_success_timestamp_seconds",
        "Unix timestamp when the statistics run last wrote its output"
    )
    .expect("readme last success timestamp")
});

pub static RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "readme_run_duration_seconds",
        "Wall time of one statistics run"
    )
    .expect("readme run duration")
});

pub static REPOSITORIES_LISTED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "readme_repositories_listed",
        "Repositories returned by the repository listing"
    )
    .expect("readme repositories listed")
});

pub static REPOS_QUERIED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "readme_repositories_queried_total",
        "Commit statistics requests issued, one per repository"
    )
    .expect("readme repositories queried")
});

pub static TOTAL_STARS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("readme_total_stars", "Stars summed across listed repositories")
        .expect("readme total stars")
});

pub static TOTAL_COMMITS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("readme_total_commits", "Commits counted inside the window")
        .expect("readme total commits")
});

/// Writes every registered metric in the Prometheus text format, for a
/// node-exporter textfile collector to pick up.
pub fn write_textfile(path: impl AsRef<Path>) -> Result<(), AppError> {
    let path = path.as_ref();
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|err| AppError::Other(anyhow::anyhow!("encoding metrics: {err}")))?;
    std::fs::write(path, buffer).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}
