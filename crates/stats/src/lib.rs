pub mod commits;
pub mod cutoff;
pub mod stars;

pub use commits::{count_weeks, repo_commits, select_repositories, RepoActivity};
pub use cutoff::{resolve_cutoff, CommitWindow};
pub use stars::sum_stars;
