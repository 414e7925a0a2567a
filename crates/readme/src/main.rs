use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use common::{config::AppConfig, logging};
use gh_broker::{GithubBrokerBuilder, GithubToken};
use readme::{metrics, BrokerGithubClient, ReadmeService};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init_logging(&config.observability.log_level);

    let token = GithubToken::new(config.github.resolved_token()?);
    let broker = GithubBrokerBuilder::new(token)
        .user_agent(config.github.user_agent.clone())
        .max_inflight(config.broker.max_inflight)
        .max_attempts(config.broker.max_attempts)
        .backoff(
            Duration::from_millis(config.broker.backoff_base_ms),
            Duration::from_millis(config.broker.backoff_max_ms),
            config.broker.jitter_frac,
        )
        .build()?;
    let client = Arc::new(BrokerGithubClient::new(
        broker,
        config.github.user_agent.clone(),
        &config.github.base_url,
    )?);

    let service = ReadmeService::new(&config, client)?;
    info!(
        source = ?config.commits.source,
        window = %config.commits.window,
        "collecting statistics"
    );
    let outcome = service.run_once().await;

    if let Some(path) = &config.observability.metrics_file {
        if let Err(err) = metrics::write_textfile(path) {
            warn!(path = %path, error = %err, "failed to write metrics textfile");
        }
    }

    let summary = outcome?;
    info!(
        total_stars = summary.total_stars,
        total_commits = summary.total_commits,
        "done"
    );
    Ok(())
}
