//! Due dates, days remaining and overdue fines.
//!
//! Everything here is a pure function of its arguments. The current instant
//! is always passed in by the caller, never read from the system clock.

pub mod calculator;
pub mod fine;

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::debug;
use rust_decimal::Decimal;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};

pub use calculator::LoanTimelineCalculator;
pub use fine::{FineAssessment, FineConfig, FineEngine};

/// length of a day used when converting elapsed time into day counts
pub const MS_PER_DAY: i64 = 86_400_000;

/// nominal loan term
pub const DEFAULT_TERM_DAYS: u32 = 30;

/// fines are counted from creation plus this many days, independently of the loan term
pub const FINE_WINDOW_DAYS: u32 = 31;

/// one percent of the balance per overdue day
pub const DEFAULT_FINE_RATE_PERCENT: Decimal = Decimal::ONE;

/// collateral may be pledged only once a loan has run this long
pub const PAWN_WAIT_DAYS: i64 = 30;

// a wall-clock gap is never longer than this in the tz database
const MAX_GAP_HOURS: i64 = 3;

/// add whole calendar days, keeping the local time of day in the timestamp's zone.
///
/// Returns `None` when the result cannot be represented.
pub fn add_calendar_days<Tz: TimeZone>(start: &DateTime<Tz>, days: u32) -> Option<DateTime<Tz>> {
    shift_calendar_days(start, i64::from(days))
}

/// signed variant of [`add_calendar_days`]
fn shift_calendar_days<Tz: TimeZone>(start: &DateTime<Tz>, days: i64) -> Option<DateTime<Tz>> {
    let local = start.naive_local();
    let target = if days >= 0 {
        local.checked_add_days(Days::new(days.unsigned_abs()))?
    } else {
        local.checked_sub_days(Days::new(days.unsigned_abs()))?
    };
    resolve_local(&start.timezone(), target)
}

/// number of calendar days from `start` reached by `now`: the largest `k` such
/// that `start + k` calendar days is not after `now`. Negative before `start`.
pub fn calendar_days_elapsed<Tz: TimeZone, Tz2: TimeZone>(start: &DateTime<Tz>, now: &DateTime<Tz2>) -> Option<i64> {
    let now = now.with_timezone(&Utc);
    let mark = |k: i64| shift_calendar_days(start, k).map(|dt| dt.with_timezone(&Utc));

    // start from the real elapsed day count and step onto the calendar mark
    let mut k = (now - start.with_timezone(&Utc)).num_milliseconds().div_euclid(MS_PER_DAY);
    while mark(k)? > now {
        k -= 1;
    }
    while mark(k + 1)? <= now {
        k += 1;
    }
    Some(k)
}

/// due date of a loan: creation plus `term_days` calendar days
pub fn due_date<Tz: TimeZone>(created_at: &DateTime<Tz>, term_days: u32) -> Option<DateTime<Tz>> {
    add_calendar_days(created_at, term_days)
}

/// signed day count of `delta`, rounded up to the next whole day.
///
/// `delta` is truncated to whole milliseconds first, so less than 1 ms past a
/// day boundary does not start a new day.
pub fn ceil_days(delta: Duration) -> i64 {
    let ms = delta.num_milliseconds();
    let floor = ms.div_euclid(MS_PER_DAY);
    if ms.rem_euclid(MS_PER_DAY) == 0 {
        floor
    } else {
        floor + 1
    }
}

/// whole days left until the loan is due, counted on the calendar of `created_at`.
///
/// Equals `ceil((due - now) / 1 day)` wherever every day lasts 24 hours; across
/// a DST change each calendar day still counts once, so at creation the result
/// is exactly `term_days`. Negative when overdue, zero on the due day. A `now`
/// earlier than `created_at` yields more than `term_days`.
pub fn days_remaining<Tz: TimeZone, Tz2: TimeZone>(
    created_at: &DateTime<Tz>,
    term_days: u32,
    now: &DateTime<Tz2>,
) -> Option<i64> {
    due_date(created_at, term_days)?;
    let elapsed = calendar_days_elapsed(created_at, now)?;
    Some(i64::from(term_days) - elapsed)
}

/// days elapsed past `due_date`, counting any started day, never negative
pub fn overdue_fine_days<Tz: TimeZone, Tz2: TimeZone>(due_date: &DateTime<Tz>, now: &DateTime<Tz2>) -> u32 {
    let signed = ceil_days(now.with_timezone(&Utc) - due_date.with_timezone(&Utc));
    let clamped = signed.max(0);
    u32::try_from(clamped).unwrap_or(u32::MAX)
}

/// flat fine: the overdue day count is the percentage applied once to the balance.
///
/// `fine = overdue_days * rate_percent_per_day / 100 * balance_due`, not compounded
/// and not rounded.
pub fn fine_amount(overdue_days: u32, balance_due: Money, rate_percent_per_day: Decimal) -> Money {
    let percent = Decimal::from(overdue_days) * rate_percent_per_day;
    balance_due.percentage(percent)
}

/// whether `PAWN_WAIT_DAYS` full days have passed since `created_at`
pub fn pawn_allowed<Tz: TimeZone, Tz2: TimeZone>(created_at: &DateTime<Tz>, now: &DateTime<Tz2>) -> bool {
    now.with_timezone(&Utc) - created_at.with_timezone(&Utc) >= Duration::days(PAWN_WAIT_DAYS)
}

/// parse a timestamp coming from outside the library.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00Z`), a local date-time without offset
/// (`2024-01-01T10:00:00`, read in `tz`) or a bare date (midnight in `tz`).
pub fn parse_timestamp<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LoanError::InvalidDate {
            message: "empty timestamp".to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(tz));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| LoanError::InvalidDate {
            message: format!("{value}: {e}"),
        })?;

    resolve_local(tz, naive).ok_or_else(|| LoanError::InvalidDate {
        message: format!("{value}: not a valid local time"),
    })
}

/// map a wall-clock time to an instant, picking the earlier instant on a
/// repeated hour and moving forward across a skipped one
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => {
            debug!("ambiguous local time {local}, using the earlier instant");
            Some(earliest)
        }
        LocalResult::None => {
            debug!("local time {local} falls in a gap, moving forward");
            (1..=MAX_GAP_HOURS).find_map(|hours| {
                let shifted = local.checked_add_signed(Duration::hours(hours))?;
                tz.from_local_datetime(&shifted).earliest()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Sao_Paulo;
    use chrono_tz::Europe::Lisbon;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_days_remaining_mid_term() {
        // due 2024-01-31: 11 whole days from the 20th, 10 from the 21st
        let created = utc(2024, 1, 1);
        assert_eq!(days_remaining(&created, 30, &utc(2024, 1, 20)), Some(11));
        assert_eq!(days_remaining(&created, 30, &(utc(2024, 1, 20) + Duration::hours(12))), Some(11));
        assert_eq!(days_remaining(&created, 30, &utc(2024, 1, 21)), Some(10));
    }

    #[test]
    fn test_days_remaining_at_creation_is_full_term() {
        let created = Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 10).unwrap();
        assert_eq!(days_remaining(&created, 30, &created), Some(30));
        assert_eq!(days_remaining(&created, 31, &created), Some(31));
    }

    #[test]
    fn test_days_remaining_on_due_date_is_zero() {
        let created = utc(2024, 1, 1);
        let due = due_date(&created, 30).unwrap();
        assert_eq!(due, utc(2024, 1, 31));
        assert_eq!(days_remaining(&created, 30, &due), Some(0));
    }

    #[test]
    fn test_partial_day_counts_as_full_day() {
        let created = utc(2024, 1, 1);
        let now = utc(2024, 1, 30) + Duration::hours(23);
        // one hour left
        assert_eq!(days_remaining(&created, 30, &now), Some(1));
    }

    #[test]
    fn test_days_remaining_negative_when_overdue() {
        let created = utc(2024, 1, 1);
        let now = utc(2024, 2, 5);
        assert_eq!(days_remaining(&created, 30, &now), Some(-5));
    }

    #[test]
    fn test_now_before_creation_exceeds_term() {
        let created = utc(2024, 1, 10);
        let now = utc(2024, 1, 5);
        assert_eq!(days_remaining(&created, 30, &now), Some(35));
    }

    #[test]
    fn test_due_date_crosses_month_and_leap_day() {
        assert_eq!(due_date(&utc(2024, 1, 31), 31).unwrap(), utc(2024, 3, 2));
        assert_eq!(due_date(&utc(2024, 2, 15), 30).unwrap(), utc(2024, 3, 16));
    }

    #[test]
    fn test_due_date_keeps_wall_clock_across_dst() {
        // Lisbon springs forward on 2024-03-31
        let created = Lisbon.with_ymd_and_hms(2024, 3, 20, 10, 0, 0).unwrap();
        let due = due_date(&created, 30).unwrap();
        assert_eq!(due.naive_local(), Lisbon.with_ymd_and_hms(2024, 4, 19, 10, 0, 0).unwrap().naive_local());

        // only 30 * 24 - 1 hours elapsed, still 30 calendar days remain
        assert_eq!((due.with_timezone(&Utc) - created.with_timezone(&Utc)).num_hours(), 719);
        assert_eq!(days_remaining(&created, 30, &created), Some(30));
        assert_eq!(days_remaining(&created, 30, &due), Some(0));
    }

    #[test]
    fn test_full_term_across_fall_back() {
        // Lisbon falls back on 2024-10-27, the term lasts 30 * 24 + 1 hours
        let created = Lisbon.with_ymd_and_hms(2024, 10, 20, 10, 0, 0).unwrap();
        let due = due_date(&created, 30).unwrap();
        assert_eq!((due.with_timezone(&Utc) - created.with_timezone(&Utc)).num_hours(), 721);

        assert_eq!(days_remaining(&created, 30, &created), Some(30));
        assert_eq!(days_remaining(&created, 30, &(created.clone() + Duration::hours(1))), Some(30));
        assert_eq!(days_remaining(&created, 30, &due), Some(0));
        assert_eq!(days_remaining(&created, 30, &(due + Duration::milliseconds(1))), Some(0));
        assert_eq!(days_remaining(&created, 30, &(due + Duration::days(1))), Some(-1));
    }

    #[test]
    fn test_days_remaining_through_repeated_hour() {
        // 01:00-02:00 happens twice in Lisbon on 2024-10-27
        let created = Lisbon.with_ymd_and_hms(2024, 10, 20, 1, 45, 0).unwrap();
        let mark = Utc.with_ymd_and_hms(2024, 10, 27, 0, 45, 0).unwrap();

        assert_eq!(days_remaining(&created, 30, &(mark - Duration::minutes(15))), Some(24));
        assert_eq!(days_remaining(&created, 30, &mark), Some(23));
        assert_eq!(days_remaining(&created, 30, &(mark + Duration::minutes(45))), Some(23));

        let start = Utc.with_ymd_and_hms(2024, 10, 26, 23, 0, 0).unwrap();
        let counts: Vec<i64> = (0..60)
            .map(|step| days_remaining(&created, 30, &(start + Duration::minutes(5 * step))).unwrap())
            .collect();
        assert!(counts.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[test]
    fn test_calendar_days_elapsed() {
        let created = utc(2024, 1, 10);
        assert_eq!(calendar_days_elapsed(&created, &created), Some(0));
        assert_eq!(calendar_days_elapsed(&created, &(created - Duration::milliseconds(1))), Some(-1));
        assert_eq!(calendar_days_elapsed(&created, &utc(2024, 1, 5)), Some(-5));
        assert_eq!(calendar_days_elapsed(&created, &(utc(2024, 2, 9) - Duration::milliseconds(1))), Some(29));
        assert_eq!(calendar_days_elapsed(&created, &utc(2024, 2, 9)), Some(30));
    }

    #[test]
    fn test_due_date_in_dst_gap_moves_forward() {
        // 2018-11-04 00:00-00:59 did not exist in Sao Paulo
        let created = Sao_Paulo.with_ymd_and_hms(2018, 10, 5, 0, 30, 0).unwrap();
        let due = due_date(&created, 30).unwrap();
        assert_eq!(due.naive_local().to_string(), "2018-11-04 01:30:00");
    }

    #[test]
    fn test_pawn_allowed_after_thirty_days() {
        let created = utc(2024, 1, 1);
        assert!(!pawn_allowed(&created, &created));
        assert!(!pawn_allowed(&created, &(utc(2024, 1, 31) - Duration::milliseconds(1))));
        assert!(pawn_allowed(&created, &utc(2024, 1, 31)));
        assert!(!pawn_allowed(&created, &utc(2023, 12, 1)));
    }

    #[test]
    fn test_fine_days_zero_before_and_at_due() {
        let due = utc(2024, 2, 1);
        assert_eq!(overdue_fine_days(&due, &utc(2024, 1, 15)), 0);
        assert_eq!(overdue_fine_days(&due, &due), 0);
    }

    #[test]
    fn test_fine_days_ceiling() {
        let due = utc(2024, 2, 1);
        assert_eq!(overdue_fine_days(&due, &(due + Duration::milliseconds(1))), 1);
        assert_eq!(overdue_fine_days(&due, &(due + Duration::days(1))), 1);
        assert_eq!(overdue_fine_days(&due, &(due + Duration::days(1) + Duration::milliseconds(1))), 2);
    }

    #[test]
    fn test_fine_scenario() {
        let created = utc(2024, 1, 1);
        let due = due_date(&created, FINE_WINDOW_DAYS).unwrap();
        assert_eq!(due, utc(2024, 2, 1));

        let days = overdue_fine_days(&due, &utc(2024, 2, 5));
        assert_eq!(days, 4);

        let fine = fine_amount(days, Money::from_major(5_000), DEFAULT_FINE_RATE_PERCENT);
        assert_eq!(fine, Money::from_major(200));
    }

    #[test]
    fn test_fine_amount_formula() {
        assert_eq!(fine_amount(0, Money::from_major(12_345), DEFAULT_FINE_RATE_PERCENT), Money::ZERO);
        assert_eq!(fine_amount(10, Money::from_major(1_000), DEFAULT_FINE_RATE_PERCENT), Money::from_major(100));
        assert_eq!(fine_amount(10, Money::from_major(1_000), dec!(0.5)), Money::from_major(50));
        assert_eq!(fine_amount(5, Money::ZERO, DEFAULT_FINE_RATE_PERCENT), Money::ZERO);
        assert!(fine_amount(5, Money::from_major(-100), DEFAULT_FINE_RATE_PERCENT).is_negative());
    }

    #[test]
    fn test_fine_amount_full_precision() {
        let balance = Money::from_str_exact("1234.57").unwrap();
        let fine = fine_amount(3, balance, DEFAULT_FINE_RATE_PERCENT);
        assert_eq!(fine, Money::from_str_exact("37.0371").unwrap());
        assert_eq!(fine.round_dp(2).to_string(), "37.04");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-01-01T10:00:00+02:00", &Utc).unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());

        let local = parse_timestamp("2024-01-01T10:00:00", &Lisbon).unwrap();
        assert_eq!(local.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());

        let date = parse_timestamp("2024-01-01", &Utc).unwrap();
        assert_eq!(date, utc(2024, 1, 1));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(matches!(parse_timestamp("", &Utc), Err(LoanError::InvalidDate { .. })));
        assert!(matches!(parse_timestamp("not a date", &Utc), Err(LoanError::InvalidDate { .. })));
        assert!(matches!(parse_timestamp("2024-02-30", &Utc), Err(LoanError::InvalidDate { .. })));
    }

    #[test]
    fn test_ceil_days_signs() {
        assert_eq!(ceil_days(Duration::zero()), 0);
        assert_eq!(ceil_days(Duration::milliseconds(-1)), 0);
        assert_eq!(ceil_days(Duration::milliseconds(-MS_PER_DAY)), -1);
        assert_eq!(ceil_days(Duration::milliseconds(-MS_PER_DAY - 1)), -1);
        assert_eq!(ceil_days(Duration::milliseconds(MS_PER_DAY + 1)), 2);
        // under a millisecond is dropped before rounding up
        assert_eq!(ceil_days(Duration::microseconds(999)), 0);
        assert_eq!(ceil_days(Duration::milliseconds(MS_PER_DAY) + Duration::microseconds(999)), 1);
    }

    fn instant() -> impl Strategy<Value = DateTime<Utc>> {
        // 2000-01-01 .. 2100-01-01
        (946_684_800_000i64..4_102_444_800_000i64)
            .prop_map(|ms| DateTime::<Utc>::from_timestamp_millis(ms).unwrap())
    }

    fn lisbon_instant() -> impl Strategy<Value = DateTime<chrono_tz::Tz>> {
        instant().prop_map(|dt| dt.with_timezone(&Lisbon))
    }

    proptest! {
        #[test]
        fn prop_full_term_at_creation_in_dst_zone(created in lisbon_instant(), term in 1u32..400) {
            prop_assert_eq!(days_remaining(&created, term, &created), Some(i64::from(term)));
            let due = due_date(&created, term).unwrap();
            prop_assert_eq!(days_remaining(&created, term, &due), Some(0));
        }

        #[test]
        fn prop_days_remaining_non_increasing_in_dst_zone(
            created in lisbon_instant(),
            term in 1u32..400,
            offset in -10_000_000_000i64..10_000_000_000i64,
            step in 0i64..10_000_000_000i64,
        ) {
            let earlier = created.clone() + Duration::milliseconds(offset);
            let later = earlier.clone() + Duration::milliseconds(step);
            let a = days_remaining(&created, term, &earlier).unwrap();
            let b = days_remaining(&created, term, &later).unwrap();
            prop_assert!(b <= a);
        }

        #[test]
        fn prop_full_term_at_creation(created in instant(), term in 1u32..400) {
            prop_assert_eq!(days_remaining(&created, term, &created), Some(i64::from(term)));
        }

        #[test]
        fn prop_zero_on_due_date(created in instant(), term in 1u32..400) {
            let due = due_date(&created, term).unwrap();
            prop_assert_eq!(days_remaining(&created, term, &due), Some(0));
        }

        #[test]
        fn prop_days_remaining_non_increasing(
            created in instant(),
            term in 1u32..400,
            offset in -10_000_000_000i64..10_000_000_000i64,
            step in 0i64..10_000_000_000i64,
        ) {
            let earlier = created + Duration::milliseconds(offset);
            let later = earlier + Duration::milliseconds(step);
            let a = days_remaining(&created, term, &earlier).unwrap();
            let b = days_remaining(&created, term, &later).unwrap();
            prop_assert!(b <= a);
        }

        #[test]
        fn prop_fine_days_zero_until_due(due in instant(), before in 0i64..10_000_000_000i64) {
            let now = due - Duration::milliseconds(before);
            prop_assert_eq!(overdue_fine_days(&due, &now), 0);
        }

        #[test]
        fn prop_fine_days_non_decreasing(
            due in instant(),
            offset in -10_000_000_000i64..10_000_000_000i64,
            step in 0i64..10_000_000_000i64,
        ) {
            let earlier = due + Duration::milliseconds(offset);
            let later = earlier + Duration::milliseconds(step);
            prop_assert!(overdue_fine_days(&due, &later) >= overdue_fine_days(&due, &earlier));
        }
    }
}
