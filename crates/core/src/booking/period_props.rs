//! Property-based tests for accounting period locks.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use super::period::{AccountingPeriod, is_date_locked};

/// Strategy for a date between 2000-01-01 and roughly 2054.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..20_000u64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.checked_add_days(Days::new(offset)))
            .unwrap()
    })
}

/// Strategy for a period of 1 to 400 days.
fn period_strategy() -> impl Strategy<Value = AccountingPeriod> {
    (date_strategy(), 0u64..400u64, any::<bool>()).prop_map(|(from_date, len, is_locked)| {
        AccountingPeriod {
            from_date,
            to_date: from_date.checked_add_days(Days::new(len)).unwrap(),
            is_locked,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Locked iff the period is locked and the date is within both bounds.
    #[test]
    fn prop_lock_matches_range(period in period_strategy(), date in date_strategy()) {
        let expected = period.is_locked && period.from_date <= date && date <= period.to_date;
        prop_assert_eq!(period.locks(date), expected);
        prop_assert_eq!(is_date_locked(&[period], Some(date)), expected);
    }

    /// The day before and the day after a locked period are never locked by it.
    #[test]
    fn prop_adjacent_days_unlocked(period in period_strategy()) {
        let locked = AccountingPeriod { is_locked: true, ..period };
        let before = locked.from_date.pred_opt().unwrap();
        let after = locked.to_date.succ_opt().unwrap();
        prop_assert!(!locked.locks(before));
        prop_assert!(!locked.locks(after));
        prop_assert!(locked.locks(locked.from_date));
        prop_assert!(locked.locks(locked.to_date));
    }

    /// Without a date nothing is locked.
    #[test]
    fn prop_missing_date_never_locked(periods in prop::collection::vec(period_strategy(), 0..5)) {
        prop_assert!(!is_date_locked(&periods, None));
    }
}
