//! Serializable view of a loan's timeline.
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{LoanId, LoanStatus};
use crate::urgency::UrgencyBand;

/// days remaining and fine for one loan at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub loan_id: LoanId,
    pub status: LoanStatus,
    pub as_of: DateTime<Utc>,
    pub created_at: DateTime<FixedOffset>,
    pub due_date: DateTime<FixedOffset>,
    pub term_days: u32,
    pub days_remaining: i64,
    pub urgency: UrgencyBand,
    pub loan_amount: Money,
    pub balance_due: Money,
    pub fine: FineView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineView {
    /// fines accrue for any time past this instant
    pub starts_after: DateTime<FixedOffset>,
    pub overdue_days: u32,
    /// full precision
    pub amount: Money,
    pub rate_percent_per_day: Decimal,
}

impl TimelineSnapshot {
    pub fn is_overdue(&self) -> bool {
        self.days_remaining < 0
    }

    /// false means the caller shows "no fine" whatever the balance
    pub fn has_fine(&self) -> bool {
        self.fine.overdue_days > 0
    }

    /// fine rounded for display
    pub fn fine_display_amount(&self) -> Money {
        self.fine.amount.round_dp(2)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
