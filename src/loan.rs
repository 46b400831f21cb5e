use chrono::{DateTime, Duration, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::events::{EventStore, LoanEvent};
use crate::snapshot::TimelineSnapshot;
use crate::config::TimelineConfig;
use crate::timeline::{pawn_allowed, LoanTimelineCalculator, DEFAULT_TERM_DAYS, PAWN_WAIT_DAYS};
use crate::types::{LoanId, LoanStatus, StatusNotification};

/// a loan as far as due dates and fines are concerned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    customer_id: String,
    customer_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    loan_amount: Money,
    balance_due: Money,
    term_days: u32,
    installments: u32,
    status: LoanStatus,
    pawn: bool,
    #[serde(skip)]
    events: EventStore,
}

impl Loan {
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    /// set once when the loan is built
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn loan_amount(&self) -> Money {
        self.loan_amount
    }

    pub fn balance_due(&self) -> Money {
        self.balance_due
    }

    pub fn term_days(&self) -> u32 {
        self.term_days
    }

    pub fn installments(&self) -> u32 {
        self.installments
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn is_pawned(&self) -> bool {
        self.pawn
    }

    /// days remaining and fine as of the clock's current instant
    pub fn timeline(
        &self,
        calculator: &LoanTimelineCalculator,
        time_provider: &SafeTimeProvider,
    ) -> Result<TimelineSnapshot> {
        calculator.snapshot(self, &time_provider.now())
    }

    /// set a new status; returns the notification the customer should receive.
    ///
    /// Setting the current status again is a no-op and emits nothing.
    pub fn update_status(
        &mut self,
        new_status: LoanStatus,
        time_provider: &SafeTimeProvider,
    ) -> Option<StatusNotification> {
        if new_status == self.status {
            debug!("loan {} already {}", self.id, new_status);
            return None;
        }

        let now = time_provider.now();
        let old_status = self.status;
        let notification = new_status.notification();

        self.status = new_status;
        self.updated_at = now;

        self.events.emit(LoanEvent::StatusChanged {
            loan_id: self.id,
            old_status,
            new_status,
            notification,
            timestamp: now,
        });

        notification
    }

    /// record whether collateral has been pledged.
    ///
    /// The flag is locked until the loan has run `PAWN_WAIT_DAYS` full days.
    pub fn set_pawn(&mut self, pawned: bool, time_provider: &SafeTimeProvider) -> Result<()> {
        if self.pawn == pawned {
            return Ok(());
        }

        let now = time_provider.now();
        if !pawn_allowed(&self.created_at, &now) {
            warn!("loan {} is too recent to change its pawn flag", self.id);
            return Err(LoanError::PawnTooEarly {
                id: self.id,
                available_from: self.created_at + Duration::days(PAWN_WAIT_DAYS),
            });
        }

        self.pawn = pawned;
        self.updated_at = now;

        self.events.emit(LoanEvent::PawnUpdated {
            loan_id: self.id,
            pawned,
            timestamp: now,
        });

        Ok(())
    }

    /// replace the outstanding balance after a repayment was booked elsewhere
    pub fn set_balance_due(&mut self, balance: Money, time_provider: &SafeTimeProvider) -> Result<()> {
        if balance.is_negative() {
            return Err(LoanError::InvalidBalance { amount: balance });
        }

        let now = time_provider.now();
        let old_balance = self.balance_due;
        self.balance_due = balance;
        self.updated_at = now;

        self.events.emit(LoanEvent::BalanceUpdated {
            loan_id: self.id,
            old_balance,
            new_balance: balance,
            timestamp: now,
        });

        Ok(())
    }

    /// active loans are still running and must not be deleted
    pub fn can_delete(&self) -> bool {
        self.status != LoanStatus::Active
    }

    pub fn ensure_deletable(&self) -> Result<()> {
        if self.can_delete() {
            Ok(())
        } else {
            warn!("refusing to delete active loan {}", self.id);
            Err(LoanError::ActiveLoanNotDeletable { id: self.id })
        }
    }

    pub fn events(&self) -> &[LoanEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<LoanEvent> {
        self.events.take_events()
    }
}

/// builder for loans
#[derive(Debug, Default)]
pub struct LoanBuilder {
    id: Option<LoanId>,
    amount: Option<Money>,
    balance_due: Option<Money>,
    term_days: Option<u32>,
    created_at: Option<DateTime<Utc>>,
    customer_id: Option<String>,
    customer_name: Option<String>,
    installments: Option<u32>,
    status: Option<LoanStatus>,
    pawn: bool,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// reuse an identifier issued elsewhere
    pub fn id(mut self, id: LoanId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    /// defaults to the full loan amount
    pub fn balance_due(mut self, balance: Money) -> Self {
        self.balance_due = Some(balance);
        self
    }

    pub fn term_days(mut self, days: u32) -> Self {
        self.term_days = Some(days);
        self
    }

    /// defaults to the clock's current instant
    pub fn created_at(mut self, date: DateTime<Utc>) -> Self {
        self.created_at = Some(date);
        self
    }

    pub fn customer_id(mut self, customer: impl Into<String>) -> Self {
        self.customer_id = Some(customer.into());
        self
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn installments(mut self, installments: u32) -> Self {
        self.installments = Some(installments);
        self
    }

    pub fn status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn pawn(mut self, pawned: bool) -> Self {
        self.pawn = pawned;
        self
    }

    /// build with system time
    pub fn build(self) -> Result<Loan> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.build_with_time(&time)
    }

    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<Loan> {
        self.finish(DEFAULT_TERM_DAYS, time_provider)
    }

    /// build with the configured default term when none was set
    pub fn build_with_config(self, config: &TimelineConfig, time_provider: &SafeTimeProvider) -> Result<Loan> {
        self.finish(config.default_term_days, time_provider)
    }

    fn finish(self, default_term_days: u32, time_provider: &SafeTimeProvider) -> Result<Loan> {
        let amount = self.amount.ok_or(LoanError::InvalidConfiguration {
            message: "Amount required".to_string(),
        })?;
        if !amount.is_positive() {
            return Err(LoanError::InvalidLoanAmount { amount });
        }

        let balance_due = self.balance_due.unwrap_or(amount);
        if balance_due.is_negative() {
            return Err(LoanError::InvalidBalance { amount: balance_due });
        }

        let term_days = self.term_days.unwrap_or(default_term_days);
        if term_days == 0 {
            return Err(LoanError::InvalidTerm { term_days });
        }

        let installments = self.installments.unwrap_or(1);
        if installments == 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "at least one installment required".to_string(),
            });
        }

        let now = time_provider.now();
        let created_at = self.created_at.unwrap_or(now);

        let customer_id = self.customer_id.unwrap_or_else(|| {
            format!("CUST-{}", Uuid::new_v4().simple().to_string()[..8].to_uppercase())
        });

        let mut loan = Loan {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            customer_name: self.customer_name.unwrap_or_default(),
            customer_id,
            created_at,
            updated_at: created_at,
            loan_amount: amount,
            balance_due,
            term_days,
            installments,
            status: self.status.unwrap_or(LoanStatus::Pending),
            pawn: self.pawn,
            events: EventStore::new(),
        };

        loan.events.emit(LoanEvent::LoanCreated {
            loan_id: loan.id,
            customer_id: loan.customer_id.clone(),
            amount,
            term_days,
            timestamp: now,
        });

        Ok(loan)
    }
}
