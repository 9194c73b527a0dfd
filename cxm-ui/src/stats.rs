//! Aggregation over the submission log
//!
//! Pure functions from a normalized log snapshot to the dashboard's summary
//! numbers and the trailing-week activity series. The snapshot is unbounded
//! and grows forever; everything here is recomputed from scratch on demand
//! and must stay correct (all zeros, no errors) for an empty snapshot.

use chrono::NaiveDate;
use cxm_common::models::Submission;
use serde::Serialize;

/// Summary statistics over the full submission history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Total submission count
    pub total: usize,
    /// Submissions whose full-complete flag is set
    pub fully_complete: usize,
    /// Mean completed-item count, rounded to one decimal place
    pub average_items: f64,
}

/// One calendar day of the activity series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityBucket {
    pub date: NaiveDate,
    pub count: usize,
}

/// Compute the dashboard summary numbers
pub fn summarize(submissions: &[Submission]) -> DashboardStats {
    let total = submissions.len();
    let fully_complete = submissions.iter().filter(|s| s.is_full_complete).count();
    let average_items = if total == 0 {
        0.0
    } else {
        let item_total: usize = submissions.iter().map(|s| s.completed_items.len()).sum();
        (item_total as f64 / total as f64 * 10.0).round() / 10.0
    };

    DashboardStats {
        total,
        fully_complete,
        average_items,
    }
}

/// Bucket submissions by calendar day over the trailing 7 days
///
/// One bucket per day, `today` included, oldest first. A submission falls
/// in the bucket matching the calendar date (UTC) of its creation
/// timestamp; time of day is ignored. `today` is a parameter so callers
/// and tests pin the window explicitly.
pub fn activity_last_7_days(submissions: &[Submission], today: NaiveDate) -> Vec<ActivityBucket> {
    (0..7)
        .rev()
        .map(|days_back| {
            let date = today - chrono::Duration::days(days_back);
            let count = submissions
                .iter()
                .filter(|s| s.submitted_at.date_naive() == date)
                .count();
            ActivityBucket { date, count }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn submission_on(day: u32, hour: u32, items: usize, full: bool) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            user_id: Uuid::from_u128(1),
            user_name: "Ana".to_string(),
            submitted_at: Utc.with_ymd_and_hms(2026, 8, day, hour, 30, 0).unwrap(),
            completed_items: (1..=items as u16).collect::<BTreeSet<u16>>(),
            is_full_complete: full,
            notes: None,
        }
    }

    #[test]
    fn test_empty_snapshot_yields_zeros() {
        let stats = summarize(&[]);
        assert_eq!(
            stats,
            DashboardStats {
                total: 0,
                fully_complete: 0,
                average_items: 0.0
            }
        );

        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let series = activity_last_7_days(&[], today);
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_summary_counts_and_rounded_mean() {
        let subs = vec![
            submission_on(5, 9, 20, true),
            submission_on(5, 18, 12, false),
            submission_on(6, 10, 17, false),
        ];
        let stats = summarize(&subs);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.fully_complete, 1);
        // (20 + 12 + 17) / 3 = 16.333... -> 16.3
        assert_eq!(stats.average_items, 16.3);
    }

    #[test]
    fn test_mean_rounds_half_up() {
        // (20 + 15) / 2 = 17.5 stays 17.5; (20 + 14 + 11) / 3 = 15.0
        let subs = vec![submission_on(5, 9, 20, true), submission_on(5, 10, 15, false)];
        assert_eq!(summarize(&subs).average_items, 17.5);
    }

    #[test]
    fn test_activity_buckets_by_calendar_date() {
        let subs = vec![
            submission_on(1, 8, 5, false),  // 6 days back
            submission_on(1, 22, 5, false), // same day, late shift
            submission_on(7, 9, 5, false),  // today
        ];
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let series = activity_last_7_days(&subs, today);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert_eq!(series[0].count, 2);
        assert_eq!(series[6].date, today);
        assert_eq!(series[6].count, 1);
        assert_eq!(series.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_activity_excludes_out_of_window_submissions() {
        let subs = vec![submission_on(1, 9, 5, false)];
        // Window is Aug 3..=Aug 9; the Aug 1 submission falls outside.
        let today = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap();
        let series = activity_last_7_days(&subs, today);
        assert!(series.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_buckets_run_oldest_to_newest() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let series = activity_last_7_days(&[], today);
        for window in series.windows(2) {
            assert!(window[0].date < window[1].date);
        }
    }
}
