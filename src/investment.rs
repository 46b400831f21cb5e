use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// savings plans offered to investors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvestmentPlan {
    Standard,
    Essential,
    Premium,
}

/// terms attached to a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentTerms {
    pub contract_months: u32,
    pub minimum: Money,
    pub maximum: Money,
    pub profitability: Rate,
}

impl InvestmentPlan {
    pub const ALL: [InvestmentPlan; 3] = [
        InvestmentPlan::Standard,
        InvestmentPlan::Essential,
        InvestmentPlan::Premium,
    ];

    pub fn terms(&self) -> InvestmentTerms {
        let (contract_months, minimum, maximum, profitability) = match self {
            InvestmentPlan::Standard => (3, 5_000, 24_000, 3),
            InvestmentPlan::Essential => (6, 25_000, 49_000, 7),
            InvestmentPlan::Premium => (12, 50_000, 100_000, 10),
        };

        InvestmentTerms {
            contract_months,
            minimum: Money::from_major(minimum),
            maximum: Money::from_major(maximum),
            profitability: Rate::from_percentage(profitability),
        }
    }

    /// amounts are accepted inclusively at both ends
    pub fn validate_amount(&self, amount: Money) -> Result<()> {
        let terms = self.terms();
        if amount < terms.minimum || amount > terms.maximum {
            warn!("{} investment of {} rejected", self, amount);
            return Err(LoanError::InvestmentOutOfRange {
                plan: self.to_string(),
                minimum: terms.minimum,
                maximum: terms.maximum,
                provided: amount,
            });
        }
        Ok(())
    }

    /// the plan whose range contains `amount`, if any
    pub fn for_amount(amount: Money) -> Option<InvestmentPlan> {
        Self::ALL.into_iter().find(|plan| plan.validate_amount(amount).is_ok())
    }
}

impl fmt::Display for InvestmentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvestmentPlan::Standard => "Standard",
            InvestmentPlan::Essential => "Essential",
            InvestmentPlan::Premium => "Premium",
        };
        f.write_str(name)
    }
}

impl FromStr for InvestmentPlan {
    type Err = LoanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plan| plan.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LoanError::UnknownPlan { name: s.to_string() })
    }
}
