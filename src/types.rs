use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::LoanError;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// loan status as set by an administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// request received, awaiting a decision
    Pending,
    /// approved and running, the due date clock applies
    Active,
    /// fully repaid
    Paid,
    /// request declined
    Refused,
}

impl LoanStatus {
    /// notification the customer receives when a loan enters this status
    pub fn notification(&self) -> Option<StatusNotification> {
        match self {
            LoanStatus::Refused => Some(StatusNotification::LoanRefused),
            LoanStatus::Paid => Some(StatusNotification::LoanPaid),
            LoanStatus::Active => Some(StatusNotification::LoanApproved),
            LoanStatus::Pending => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "PENDING",
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Paid => "PAID",
            LoanStatus::Refused => "REFUSED",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(LoanStatus::Pending),
            "ACTIVE" => Ok(LoanStatus::Active),
            "PAID" => Ok(LoanStatus::Paid),
            "REFUSED" => Ok(LoanStatus::Refused),
            _ => Err(LoanError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// customer notification triggered by a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusNotification {
    LoanApproved,
    LoanPaid,
    LoanRefused,
}

/// who is looking at a list of loans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Viewer {
    /// a customer sees only their own loans
    Customer { customer_id: String },
    /// an administrator sees every loan
    Admin,
}
