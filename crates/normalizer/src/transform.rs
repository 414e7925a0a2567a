use crate::models::{ContributorActivity, Repository, WeekEntry};
use crate::payloads::{CommitActivityWeek, ContributorStatsPayload, RepoPayload};

pub fn normalize_repo(payload: &RepoPayload) -> Repository {
    Repository {
        name: payload.name.clone(),
        owner: payload.owner.login.clone(),
        stars: payload.stargazers_count,
        updated_at: payload.updated_at,
    }
}

pub fn normalize_contributor(payload: &ContributorStatsPayload) -> ContributorActivity {
    ContributorActivity {
        login: payload.author.as_ref().map(|a| a.login.clone()),
        total: payload.total,
        weeks: payload
            .weeks
            .iter()
            .map(|week| WeekEntry {
                week_start: week.w,
                commits: week.c,
            })
            .collect(),
    }
}

/// Repository-wide weeks carry no author; the weekly `total` is the count.
pub fn normalize_commit_activity(payload: &[CommitActivityWeek]) -> Vec<WeekEntry> {
    payload
        .iter()
        .map(|week| WeekEntry {
            week_start: week.week,
            commits: week.total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repo_normalization_keeps_owner_and_stars() {
        let payload: RepoPayload = serde_json::from_value(json!({
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "owner": {"login": "octocat", "id": 1},
            "stargazers_count": 80,
            "updated_at": "2011-01-26T19:14:43Z"
        }))
        .expect("payload");
        let repo = normalize_repo(&payload);
        assert_eq!(repo.name, "Hello-World");
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.stars, 80);
        assert_eq!(repo.updated_at.timestamp(), 1_296_069_283);
    }

    #[test]
    fn contributor_with_null_author_has_no_login() {
        let payload: ContributorStatsPayload = serde_json::from_value(json!({
            "author": null,
            "total": 3,
            "weeks": [{"w": 1367712000, "a": 6898, "d": 77, "c": 3}]
        }))
        .expect("payload");
        let activity = normalize_contributor(&payload);
        assert_eq!(activity.login, None);
        assert_eq!(activity.total, 3);
        assert_eq!(
            activity.weeks,
            vec![WeekEntry {
                week_start: 1_367_712_000,
                commits: 3
            }]
        );
    }

    #[test]
    fn commit_activity_uses_weekly_total() {
        let payload: Vec<CommitActivityWeek> = serde_json::from_value(json!([
            {"days": [0, 3, 26, 20, 39, 1, 0], "total": 89, "week": 1336280400}
        ]))
        .expect("payload");
        let weeks = normalize_commit_activity(&payload);
        assert_eq!(weeks[0].week_start, 1_336_280_400);
        assert_eq!(weeks[0].commits, 89);
    }
}
