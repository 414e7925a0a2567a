pub mod aggregator;
pub mod client;
pub mod lister;
pub mod metrics;
pub mod render;
pub mod service;

pub use aggregator::CommitAggregator;
pub use client::{BrokerGithubClient, GithubApiError, GithubClient};
pub use lister::RepositoryLister;
pub use render::{ReadmeData, Renderer};
pub use service::{ReadmeService, RunSummary};
