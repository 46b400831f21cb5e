use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};
use crate::timeline::{FineConfig, DEFAULT_TERM_DAYS};
use crate::urgency::UrgencyThresholds;

/// timeline configuration shared by every view that shows due dates or fines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// term given to new loans when none is specified
    pub default_term_days: u32,
    /// fine window and rate
    pub fine: FineConfig,
    /// zone in which calendar days are counted
    pub time_zone: Tz,
    /// days-remaining bands
    pub urgency: UrgencyThresholds,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self::microcredit()
    }
}

impl TimelineConfig {
    /// 30-day loans, fines from day 31 at 1% of the balance per day, Maputo calendar
    pub fn microcredit() -> Self {
        Self {
            default_term_days: DEFAULT_TERM_DAYS,
            fine: FineConfig::default(),
            time_zone: chrono_tz::Africa::Maputo,
            urgency: UrgencyThresholds::default(),
        }
    }

    /// fines start as soon as the loan term ends
    pub fn aligned_window(term_days: u32, rate_percent_per_day: Decimal) -> Self {
        Self {
            default_term_days: term_days,
            fine: FineConfig::new(term_days, rate_percent_per_day),
            ..Self::microcredit()
        }
    }

    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_term_days == 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "default term must be at least one day".to_string(),
            });
        }
        self.fine.validate()?;
        self.urgency.validate()?;
        Ok(())
    }

    /// load and validate a configuration from json
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TimelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
