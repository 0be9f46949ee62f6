//! Pure streak computation for daily check-ins.
//!
//! Given the current stats, the check-in history, and "today", decide
//! whether a check-in is allowed and compute the new stats. The engine
//! holds no state and touches no clock; callers supply the day.
//!
//! A streak continues only when the previous check-in was exactly
//! yesterday. Any gap -- one missed day or many -- collapses to a fresh
//! streak of 1.

use chrono::NaiveDate;

use crate::calendar::is_yesterday;
use crate::commitment::{CommitDay, CommitmentStats};

/// Result of evaluating a check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// The check-in was recorded; the caller should append `day` to the
    /// history and replace the stats.
    Recorded {
        stats: CommitmentStats,
        day: CommitDay,
    },
    /// A check-in already exists for this calendar day. No state change.
    AlreadyCommitted,
}

/// Evaluate a check-in for `today`.
///
/// Idempotent per calendar day: a second call with the same `today`
/// returns [`CheckInOutcome::AlreadyCommitted`].
pub fn check_in(
    stats: &CommitmentStats,
    history: &[CommitDay],
    today: NaiveDate,
) -> CheckInOutcome {
    if stats.has_committed_on(today) || history.iter().any(|d| d.date == today) {
        return CheckInOutcome::AlreadyCommitted;
    }

    let current_streak = match stats.last_commit_date {
        Some(last) if is_yesterday(last, today) => stats.current_streak + 1,
        _ => 1,
    };

    let stats = CommitmentStats {
        current_streak,
        longest_streak: stats.longest_streak.max(current_streak),
        total_committed_days: stats.total_committed_days + 1,
        last_commit_date: Some(today),
    };

    CheckInOutcome::Recorded {
        stats,
        day: CommitDay::new(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Run a sequence of check-in days through the engine, as a store would.
    fn run(days: &[NaiveDate]) -> (CommitmentStats, Vec<CommitDay>) {
        let mut stats = CommitmentStats::default();
        let mut history = Vec::new();
        for &day in days {
            if let CheckInOutcome::Recorded { stats: next, day } = check_in(&stats, &history, day)
            {
                stats = next;
                history.push(day);
            }
        }
        (stats, history)
    }

    #[test]
    fn first_check_in_starts_streak_of_one() {
        let (stats, history) = run(&[d("2026-03-01")]);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.total_committed_days, 1);
        assert_eq!(stats.last_commit_date, Some(d("2026-03-01")));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn consecutive_days_grow_the_streak() {
        let (stats, _) = run(&[d("2026-03-01"), d("2026-03-02"), d("2026-03-03")]);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.total_committed_days, 3);
    }

    #[test]
    fn same_day_check_in_is_refused() {
        let (stats, history) = run(&[d("2026-03-01"), d("2026-03-01")]);
        assert_eq!(stats.total_committed_days, 1);
        assert_eq!(history.len(), 1);

        let outcome = check_in(&stats, &history, d("2026-03-01"));
        assert_eq!(outcome, CheckInOutcome::AlreadyCommitted);
    }

    #[test]
    fn one_day_gap_resets_to_one() {
        // days 0,1,2, skip day 3, check in day 4 -- spec scenario
        let (stats, _) = run(&[
            d("2026-03-01"),
            d("2026-03-02"),
            d("2026-03-03"),
            d("2026-03-05"),
        ]);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.total_committed_days, 4);
    }

    #[test]
    fn long_gap_resets_identically_to_short_gap() {
        let (short, _) = run(&[d("2026-03-01"), d("2026-03-03")]);
        let (long, _) = run(&[d("2026-03-01"), d("2026-03-20")]);
        assert_eq!(short.current_streak, 1);
        assert_eq!(long.current_streak, 1);
    }

    #[test]
    fn streak_continues_across_month_boundary() {
        let (stats, _) = run(&[d("2026-02-27"), d("2026-02-28"), d("2026-03-01")]);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn duplicate_history_entry_blocks_even_with_stale_stats() {
        // history already carries today even though last_commit_date lags
        let history = vec![CommitDay::new(d("2026-03-02"))];
        let stats = CommitmentStats {
            last_commit_date: Some(d("2026-03-01")),
            current_streak: 1,
            longest_streak: 1,
            total_committed_days: 1,
        };
        assert_eq!(
            check_in(&stats, &history, d("2026-03-02")),
            CheckInOutcome::AlreadyCommitted
        );
    }

    proptest! {
        /// longest >= current and totals match history for any gap pattern.
        #[test]
        fn invariants_hold_for_any_gap_pattern(gaps in prop::collection::vec(1i64..40, 0..60)) {
            let mut day = d("2026-01-01");
            let mut days = vec![day];
            for gap in gaps {
                day = day + Duration::days(gap);
                days.push(day);
            }
            let (stats, history) = run(&days);
            prop_assert!(stats.longest_streak >= stats.current_streak);
            prop_assert_eq!(stats.total_committed_days as usize, history.len());
            prop_assert_eq!(stats.last_commit_date, Some(*days.last().unwrap()));
        }

        /// With no gaps the streak equals the day count.
        #[test]
        fn gapless_streak_equals_day_count(n in 1u32..200) {
            let start = d("2026-01-01");
            let days: Vec<NaiveDate> =
                (0..n).map(|i| start + Duration::days(i64::from(i))).collect();
            let (stats, _) = run(&days);
            prop_assert_eq!(stats.current_streak, n);
            prop_assert_eq!(stats.longest_streak, n);
            prop_assert_eq!(stats.total_committed_days, n);
        }
    }
}
