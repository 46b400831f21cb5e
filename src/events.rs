use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus, StatusNotification};

/// events emitted when a loan record changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoanEvent {
    LoanCreated {
        loan_id: LoanId,
        customer_id: String,
        amount: Money,
        term_days: u32,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        notification: Option<StatusNotification>,
        timestamp: DateTime<Utc>,
    },
    PawnUpdated {
        loan_id: LoanId,
        pawned: bool,
        timestamp: DateTime<Utc>,
    },
    BalanceUpdated {
        loan_id: LoanId,
        old_balance: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<LoanEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: LoanEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<LoanEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LoanEvent] {
        &self.events
    }
}
