use std::str::FromStr;

use chrono::{DateTime, Duration, Local, Months, NaiveDate, TimeZone, Utc};
use common::config::CutoffClock;
use common::AppError;

/// How far back commit activity is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitWindow {
    /// One calendar year before the run started.
    LastYear,
    /// Everything the API reports.
    All,
    Since(DateTime<Utc>),
}

impl FromStr for CommitWindow {
    type Err = AppError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let value = input.trim();
        match value.to_ascii_lowercase().as_str() {
            "last_year" | "last-year" | "year" => return Ok(CommitWindow::LastYear),
            "all" | "none" => return Ok(CommitWindow::All),
            _ => {}
        }

        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Ok(CommitWindow::Since(ts.with_timezone(&Utc)));
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| CommitWindow::Since(Utc.from_utc_datetime(&naive)))
            .ok_or_else(|| {
                AppError::InvalidConfig(format!(
                    "commits.window `{value}` is not last_year, all, a date or an RFC 3339 timestamp"
                ))
            })
    }
}

/// Resolves the window to a single cutoff instant. Call once per run and
/// reuse the result for every filter.
pub fn resolve_cutoff(
    window: CommitWindow,
    clock: CutoffClock,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match window {
        CommitWindow::All => None,
        CommitWindow::Since(at) => Some(at),
        CommitWindow::LastYear => {
            let year_ago = match clock {
                CutoffClock::Utc => now.checked_sub_months(Months::new(12)),
                CutoffClock::Local => now
                    .with_timezone(&Local)
                    .checked_sub_months(Months::new(12))
                    .map(|local| local.with_timezone(&Utc)),
            };
            Some(year_ago.unwrap_or_else(|| now - Duration::days(365)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keywords() {
        assert_eq!("last_year".parse::<CommitWindow>().unwrap(), CommitWindow::LastYear);
        assert_eq!(" ALL ".parse::<CommitWindow>().unwrap(), CommitWindow::All);
    }

    #[test]
    fn parses_plain_date_as_utc_midnight() {
        let window: CommitWindow = "2021-01-01".parse().unwrap();
        let expected = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(window, CommitWindow::Since(expected));
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let window: CommitWindow = "2021-06-01T02:00:00+02:00".parse().unwrap();
        let expected = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(window, CommitWindow::Since(expected));
    }

    #[test]
    fn rejects_garbage() {
        let err = "since forever".parse::<CommitWindow>().unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn last_year_is_one_calendar_year_back() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();
        let cutoff = resolve_cutoff(CommitWindow::LastYear, CutoffClock::Utc, now).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2023, 3, 15, 12, 30, 0).unwrap());
    }

    #[test]
    fn local_clock_last_year_is_about_a_year_back() {
        let now = Utc.with_ymd_and_hms(2024, 7, 10, 8, 0, 0).unwrap();
        let cutoff = resolve_cutoff(CommitWindow::LastYear, CutoffClock::Local, now).unwrap();
        let days = (now - cutoff).num_days();
        assert!((364..=367).contains(&days), "{days} days back");
        assert!(cutoff < now);
    }

    #[test]
    fn all_has_no_cutoff() {
        assert_eq!(resolve_cutoff(CommitWindow::All, CutoffClock::Local, Utc::now()), None);
    }

    #[test]
    fn explicit_date_ignores_clock() {
        let at = Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(
            resolve_cutoff(CommitWindow::Since(at), CutoffClock::Local, Utc::now()),
            Some(at)
        );
    }
}
