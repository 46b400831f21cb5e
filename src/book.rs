use chrono::{DateTime, Utc};
use log::debug;

use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::snapshot::TimelineSnapshot;
use crate::timeline::LoanTimelineCalculator;
use crate::types::{LoanId, Viewer};

/// in-memory list of loans with the filtering the loan tables apply
#[derive(Debug, Clone, Default)]
pub struct LoanBook {
    loans: Vec<Loan>,
}

impl LoanBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_loans(loans: Vec<Loan>) -> Self {
        Self { loans }
    }

    pub fn insert(&mut self, loan: Loan) {
        self.loans.push(loan);
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn get(&self, id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id() == id)
    }

    pub fn get_mut(&mut self, id: LoanId) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|l| l.id() == id)
    }

    /// remove a loan unless it is still active
    pub fn remove(&mut self, id: LoanId) -> Result<Loan> {
        let index = self
            .loans
            .iter()
            .position(|l| l.id() == id)
            .ok_or(LoanError::LoanNotFound { id })?;

        self.loans[index].ensure_deletable()?;
        Ok(self.loans.remove(index))
    }

    /// loans the viewer may see, newest first
    pub fn visible_to(&self, viewer: &Viewer) -> Vec<&Loan> {
        let mut visible: Vec<&Loan> = self
            .loans
            .iter()
            .filter(|loan| match viewer {
                Viewer::Admin => true,
                Viewer::Customer { customer_id } => loan.customer_id() == customer_id.as_str(),
            })
            .collect();

        visible.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        visible
    }

    /// visible loans whose customer name contains `term`, ignoring case
    pub fn search(&self, viewer: &Viewer, term: &str) -> Vec<&Loan> {
        let needle = term.trim().to_lowercase();
        self.visible_to(viewer)
            .into_iter()
            .filter(|loan| needle.is_empty() || loan.customer_name().to_lowercase().contains(&needle))
            .collect()
    }

    /// one timeline row per visible loan, in display order
    pub fn timelines(
        &self,
        viewer: &Viewer,
        calculator: &LoanTimelineCalculator,
        now: &DateTime<Utc>,
    ) -> Result<Vec<TimelineSnapshot>> {
        let rows = self
            .visible_to(viewer)
            .into_iter()
            .map(|loan| calculator.snapshot(loan, now))
            .collect::<Result<Vec<_>>>()?;

        debug!("computed {} timeline rows", rows.len());
        Ok(rows)
    }
}
