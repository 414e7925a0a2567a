use chrono::{DateTime, Utc};
use normalizer::{ContributorActivity, Repository, WeekEntry};
use tracing::debug;

/// One repository's answer from a statistics endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum RepoActivity {
    /// Per-author weekly history; only the configured account counts.
    Contributors(Vec<ContributorActivity>),
    /// Weekly totals for all authors, already windowed by the API.
    Weekly(Vec<WeekEntry>),
}

/// Repositories touched strictly after `cutoff`; all of them without one.
pub fn select_repositories(
    repositories: &[Repository],
    cutoff: Option<DateTime<Utc>>,
) -> Vec<&Repository> {
    repositories
        .iter()
        .filter(|repo| cutoff.map_or(true, |at| repo.updated_at > at))
        .collect()
}

/// Sums commits of weeks starting strictly after `cutoff`. A week starting
/// exactly at the cutoff is excluded. Saturates instead of wrapping.
pub fn count_weeks(weeks: &[WeekEntry], cutoff: Option<DateTime<Utc>>) -> u64 {
    let floor = cutoff.map(|at| at.timestamp());
    weeks
        .iter()
        .filter(|week| floor.map_or(true, |secs| week.week_start > secs))
        .fold(0u64, |total, week| total.saturating_add(week.commits))
}

pub fn repo_commits(activity: &RepoActivity, login: &str, cutoff: Option<DateTime<Utc>>) -> u64 {
    match activity {
        RepoActivity::Contributors(contributors) => {
            let Some(entry) = contributors.iter().find(|c| {
                c.login
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(login))
            }) else {
                debug!(login, "account has no contributor entry");
                return 0;
            };
            count_weeks(&entry.weeks, cutoff)
        }
        RepoActivity::Weekly(weeks) => count_weeks(weeks, cutoff),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn week(week_start: i64, commits: u64) -> WeekEntry {
        WeekEntry {
            week_start,
            commits,
        }
    }

    fn contributor(login: Option<&str>, weeks: Vec<WeekEntry>) -> ContributorActivity {
        ContributorActivity {
            login: login.map(String::from),
            total: weeks.iter().fold(0u64, |acc, w| acc.saturating_add(w.commits)),
            weeks,
        }
    }

    fn repo(name: &str, updated_secs: i64) -> Repository {
        Repository {
            name: name.into(),
            owner: "octocat".into(),
            stars: 0,
            updated_at: Utc.timestamp_opt(updated_secs, 0).unwrap(),
        }
    }

    fn at(secs: i64) -> Option<DateTime<Utc>> {
        Some(Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn no_cutoff_counts_every_week() {
        let weeks = vec![week(100, 2), week(200, 3), week(300, 4)];
        assert_eq!(count_weeks(&weeks, None), 9);
    }

    #[test]
    fn week_starting_at_cutoff_is_excluded() {
        let weeks = vec![week(100, 2), week(200, 3), week(300, 4)];
        assert_eq!(count_weeks(&weeks, at(200)), 4);
        assert_eq!(count_weeks(&weeks, at(199)), 7);
    }

    #[test]
    fn sub_second_cutoff_excludes_the_week_it_falls_in() {
        let weeks = vec![week(200, 3), week(201, 1)];
        let cutoff = Some(Utc.timestamp_opt(200, 500_000_000).unwrap());
        assert_eq!(count_weeks(&weeks, cutoff), 1);
    }

    #[test]
    fn week_sums_saturate() {
        let weeks = vec![week(100, u64::MAX), week(200, 3)];
        assert_eq!(count_weeks(&weeks, None), u64::MAX);
    }

    #[test]
    fn missing_contributor_counts_zero() {
        let activity = RepoActivity::Contributors(vec![contributor(
            Some("someone-else"),
            vec![week(100, 5)],
        )]);
        assert_eq!(repo_commits(&activity, "octocat", None), 0);
    }

    #[test]
    fn contributor_match_ignores_case_and_ghost_authors() {
        let activity = RepoActivity::Contributors(vec![
            contributor(None, vec![week(100, 50)]),
            contributor(Some("OctoCat"), vec![week(100, 5), week(300, 1)]),
        ]);
        assert_eq!(repo_commits(&activity, "octocat", None), 6);
        assert_eq!(repo_commits(&activity, "octocat", at(100)), 1);
    }

    #[test]
    fn weekly_totals_skip_contributor_matching() {
        let activity = RepoActivity::Weekly(vec![week(100, 7), week(200, 8)]);
        assert_eq!(repo_commits(&activity, "nobody", at(150)), 8);
    }

    #[test]
    fn selection_drops_repositories_not_updated_after_cutoff() {
        let repos = vec![repo("old", 100), repo("edge", 200), repo("new", 300)];
        let names: Vec<_> = select_repositories(&repos, at(200))
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["new"]);
        assert_eq!(select_repositories(&repos, None).len(), 3);
    }
}
