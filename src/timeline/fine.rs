use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::timeline::{due_date, fine_amount, overdue_fine_days, DEFAULT_FINE_RATE_PERCENT, FINE_WINDOW_DAYS};

/// fine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineConfig {
    /// days after creation before fines start; independent of the loan term
    pub window_days: u32,
    /// percent of the balance charged per overdue day, applied once (not compounded)
    pub rate_percent_per_day: Decimal,
}

impl Default for FineConfig {
    fn default() -> Self {
        Self {
            window_days: FINE_WINDOW_DAYS,
            rate_percent_per_day: DEFAULT_FINE_RATE_PERCENT,
        }
    }
}

impl FineConfig {
    pub fn new(window_days: u32, rate_percent_per_day: Decimal) -> Self {
        Self {
            window_days,
            rate_percent_per_day,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_days == 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "fine window must be at least one day".to_string(),
            });
        }
        if self.rate_percent_per_day.is_sign_negative() {
            return Err(LoanError::InvalidConfiguration {
                message: format!("negative fine rate: {}", self.rate_percent_per_day),
            });
        }
        Ok(())
    }
}

/// engine for assessing overdue fines
#[derive(Debug, Clone, Default)]
pub struct FineEngine {
    pub config: FineConfig,
}

impl FineEngine {
    pub fn new(config: FineConfig) -> Self {
        Self { config }
    }

    /// date from which fines accrue
    pub fn fine_due_date<Tz: TimeZone>(&self, created_at: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        due_date(created_at, self.config.window_days)
    }

    /// fine owed on `balance_due` at `now` for a loan created at `created_at`
    pub fn assess<Tz: TimeZone, Tz2: TimeZone>(
        &self,
        created_at: &DateTime<Tz>,
        balance_due: Money,
        now: &DateTime<Tz2>,
    ) -> Option<FineAssessment<Tz>> {
        let due = self.fine_due_date(created_at)?;
        let overdue_days = overdue_fine_days(&due, now);
        let amount = fine_amount(overdue_days, balance_due, self.config.rate_percent_per_day);

        Some(FineAssessment {
            due_date: due,
            overdue_days,
            fine_amount: amount,
            balance_base: balance_due,
            rate_percent_per_day: self.config.rate_percent_per_day,
        })
    }
}

/// fine assessment result
#[derive(Debug, Clone, PartialEq)]
pub struct FineAssessment<Tz: TimeZone> {
    pub due_date: DateTime<Tz>,
    pub overdue_days: u32,
    pub fine_amount: Money,
    pub balance_base: Money,
    pub rate_percent_per_day: Decimal,
}

impl<Tz: TimeZone> FineAssessment<Tz> {
    /// whether a fine should be shown at all, regardless of the balance
    pub fn has_fine(&self) -> bool {
        self.overdue_days > 0
    }
}
