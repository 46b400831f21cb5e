use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("date out of range: {message}")]
    DateOutOfRange {
        message: String,
    },

    #[error("invalid loan amount: {amount}")]
    InvalidLoanAmount {
        amount: Money,
    },

    #[error("invalid balance due: {amount}")]
    InvalidBalance {
        amount: Money,
    },

    #[error("invalid term: {term_days} days")]
    InvalidTerm {
        term_days: u32,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: Uuid,
    },

    #[error("active loan cannot be deleted: {id}")]
    ActiveLoanNotDeletable {
        id: Uuid,
    },

    #[error("loan {id} cannot be pawned before {available_from}")]
    PawnTooEarly {
        id: Uuid,
        available_from: DateTime<Utc>,
    },

    #[error("invalid status: {value}")]
    InvalidStatus {
        value: String,
    },

    #[error("unknown investment plan: {name}")]
    UnknownPlan {
        name: String,
    },

    #[error("investment out of range for {plan}: minimum {minimum}, maximum {maximum}, provided {provided}")]
    InvestmentOutOfRange {
        plan: String,
        minimum: Money,
        maximum: Money,
        provided: Money,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Serialization {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
