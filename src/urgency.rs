use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};

/// how close a loan is to its due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UrgencyBand {
    /// due date already reached or passed
    Overdue,
    Imminent,
    Approaching,
    OnTrack,
    Comfortable,
}

/// lower bounds (exclusive) in days remaining for each band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyThresholds {
    pub comfortable_above: i64,
    pub on_track_above: i64,
    pub approaching_above: i64,
    pub imminent_above: i64,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            comfortable_above: 22,
            on_track_above: 15,
            approaching_above: 8,
            imminent_above: 0,
        }
    }
}

impl UrgencyThresholds {
    pub fn classify(&self, days_remaining: i64) -> UrgencyBand {
        match days_remaining {
            d if d > self.comfortable_above => UrgencyBand::Comfortable,
            d if d > self.on_track_above => UrgencyBand::OnTrack,
            d if d > self.approaching_above => UrgencyBand::Approaching,
            d if d > self.imminent_above => UrgencyBand::Imminent,
            _ => UrgencyBand::Overdue,
        }
    }

    /// thresholds must be strictly decreasing
    pub fn validate(&self) -> Result<()> {
        let ordered = self.comfortable_above > self.on_track_above
            && self.on_track_above > self.approaching_above
            && self.approaching_above > self.imminent_above;

        if !ordered {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "urgency thresholds must decrease: {} > {} > {} > {}",
                    self.comfortable_above,
                    self.on_track_above,
                    self.approaching_above,
                    self.imminent_above
                ),
            });
        }
        Ok(())
    }
}
