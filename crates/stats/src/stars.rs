use normalizer::Repository;

/// Saturates at `u64::MAX` rather than wrapping.
pub fn sum_stars(repositories: &[Repository]) -> u64 {
    repositories
        .iter()
        .fold(0u64, |total, repo| total.saturating_add(repo.stars))
}
