use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use hourglass_rs::SafeTimeProvider;
use log::debug;
use rust_decimal::Decimal;

use crate::config::TimelineConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::snapshot::{FineView, TimelineSnapshot};
use crate::timeline::{days_remaining, due_date, FineAssessment, FineEngine};
use crate::urgency::UrgencyBand;

/// single place every view goes through for due dates, days left and fines
#[derive(Debug, Clone)]
pub struct LoanTimelineCalculator {
    config: TimelineConfig,
    fines: FineEngine,
}

impl Default for LoanTimelineCalculator {
    fn default() -> Self {
        let config = TimelineConfig::default();
        Self {
            fines: FineEngine::new(config.fine.clone()),
            config,
        }
    }
}

impl LoanTimelineCalculator {
    pub fn new(config: TimelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fines: FineEngine::new(config.fine.clone()),
            config,
        })
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// creation instant seen in the configured calendar
    pub fn local(&self, at: &DateTime<Utc>) -> DateTime<Tz> {
        at.with_timezone(&self.config.time_zone)
    }

    pub fn due_date(&self, created_at: &DateTime<Utc>, term_days: u32) -> Result<DateTime<Tz>> {
        due_date(&self.local(created_at), term_days).ok_or_else(|| out_of_range(created_at, term_days))
    }

    pub fn days_remaining(&self, created_at: &DateTime<Utc>, term_days: u32, now: &DateTime<Utc>) -> Result<i64> {
        days_remaining(&self.local(created_at), term_days, now).ok_or_else(|| out_of_range(created_at, term_days))
    }

    pub fn assess_fine(
        &self,
        created_at: &DateTime<Utc>,
        balance_due: Money,
        now: &DateTime<Utc>,
    ) -> Result<FineAssessment<Tz>> {
        self.fines
            .assess(&self.local(created_at), balance_due, now)
            .ok_or_else(|| out_of_range(created_at, self.config.fine.window_days))
    }

    pub fn fine_rate_percent_per_day(&self) -> Decimal {
        self.config.fine.rate_percent_per_day
    }

    pub fn urgency(&self, days_remaining: i64) -> UrgencyBand {
        self.config.urgency.classify(days_remaining)
    }

    /// everything a loan row or summary card shows, as of `now`
    pub fn snapshot(&self, loan: &Loan, now: &DateTime<Utc>) -> Result<TimelineSnapshot> {
        let created_at = loan.created_at();
        let due = self.due_date(&created_at, loan.term_days())?;
        let days_remaining = self.days_remaining(&created_at, loan.term_days(), now)?;
        let fine = self.assess_fine(&created_at, loan.balance_due(), now)?;

        debug!(
            "loan {}: {} days remaining, {} overdue fine days",
            loan.id(),
            days_remaining,
            fine.overdue_days
        );

        Ok(TimelineSnapshot {
            loan_id: loan.id(),
            status: loan.status(),
            as_of: *now,
            created_at: self.local(&created_at).fixed_offset(),
            due_date: due.fixed_offset(),
            term_days: loan.term_days(),
            days_remaining,
            urgency: self.urgency(days_remaining),
            loan_amount: loan.loan_amount(),
            balance_due: loan.balance_due(),
            fine: FineView {
                starts_after: fine.due_date.fixed_offset(),
                overdue_days: fine.overdue_days,
                amount: fine.fine_amount,
                rate_percent_per_day: fine.rate_percent_per_day,
            },
        })
    }

    /// snapshot at the clock's current instant
    pub fn snapshot_now(&self, loan: &Loan, time_provider: &SafeTimeProvider) -> Result<TimelineSnapshot> {
        self.snapshot(loan, &time_provider.now())
    }
}

fn out_of_range(created_at: &DateTime<Utc>, days: u32) -> LoanError {
    LoanError::DateOutOfRange {
        message: format!("{created_at} + {days} days"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    use crate::types::LoanStatus;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_days_remaining_in_maputo_calendar() {
        let calc = LoanTimelineCalculator::default();
        let created = at(2024, 1, 1);

        assert_eq!(calc.days_remaining(&created, 30, &at(2024, 1, 21)).unwrap(), 10);
        assert_eq!(calc.days_remaining(&created, 30, &created).unwrap(), 30);
        assert_eq!(calc.due_date(&created, 30).unwrap().with_timezone(&Utc), at(2024, 1, 31));
    }

    #[test]
    fn test_full_term_in_dst_calendar() {
        let config = TimelineConfig::default().with_time_zone(chrono_tz::Europe::Lisbon);
        let calc = LoanTimelineCalculator::new(config).unwrap();
        // 10:00 in Lisbon, a week before the clocks fall back
        let created = Utc.with_ymd_and_hms(2024, 10, 20, 9, 0, 0).unwrap();

        assert_eq!(calc.days_remaining(&created, 30, &created).unwrap(), 30);
        let due = calc.due_date(&created, 30).unwrap().with_timezone(&Utc);
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 11, 19, 10, 0, 0).unwrap());
        assert_eq!(calc.days_remaining(&created, 30, &due).unwrap(), 0);
    }

    #[test]
    fn test_fine_uses_window_not_term() {
        let calc = LoanTimelineCalculator::default();
        let created = at(2024, 1, 1);
        let now = at(2024, 2, 5);

        // 30-day term: overdue by 5 days, but fines run from day 31
        assert_eq!(calc.days_remaining(&created, 30, &now).unwrap(), -5);

        let fine = calc.assess_fine(&created, Money::from_major(5_000), &now).unwrap();
        assert_eq!(fine.overdue_days, 4);
        assert_eq!(fine.fine_amount, Money::from_major(200));
    }

    #[test]
    fn test_snapshot_for_loan() {
        let time = SafeTimeProvider::new(TimeSource::Test(at(2024, 1, 1)));
        let control = time.test_control().unwrap();
        let calc = LoanTimelineCalculator::default();

        let loan = Loan::builder()
            .amount(Money::from_major(5_000))
            .status(LoanStatus::Active)
            .build_with_time(&time)
            .unwrap();

        let fresh = loan.timeline(&calc, &time).unwrap();
        assert_eq!(fresh.days_remaining, 30);
        assert_eq!(fresh.urgency, UrgencyBand::Comfortable);
        assert!(!fresh.has_fine());

        control.advance(chrono::Duration::days(35));
        let late = calc.snapshot_now(&loan, &time).unwrap();
        assert_eq!(late.days_remaining, -5);
        assert_eq!(late.urgency, UrgencyBand::Overdue);
        assert_eq!(late.fine.overdue_days, 4);
        assert_eq!(late.fine.amount, Money::from_major(200));
        assert_eq!(late.due_date.with_timezone(&Utc), at(2024, 1, 31));
        assert_eq!(late.fine.starts_after.with_timezone(&Utc), at(2024, 2, 1));
    }

    #[test]
    fn test_custom_config() {
        let config = TimelineConfig::aligned_window(31, dec!(2));
        let calc = LoanTimelineCalculator::new(config).unwrap();
        assert_eq!(calc.fine_rate_percent_per_day(), dec!(2));

        let fine = calc.assess_fine(&at(2024, 1, 1), Money::from_major(1_000), &at(2024, 2, 3)).unwrap();
        assert_eq!(fine.overdue_days, 2);
        assert_eq!(fine.fine_amount, Money::from_major(40));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = TimelineConfig::default();
        config.fine.window_days = 0;
        assert!(LoanTimelineCalculator::new(config).is_err());
    }

    #[test]
    fn test_out_of_range_due_date() {
        let calc = LoanTimelineCalculator::default();
        let far = (chrono::NaiveDate::MAX - chrono::Days::new(5))
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        assert!(matches!(calc.due_date(&far, 30), Err(LoanError::DateOutOfRange { .. })));
    }
}
