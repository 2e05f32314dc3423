//! Fiscal period types and the closing state machine.

use chrono::{DateTime, NaiveDate, Utc};
use saldo_shared::types::{FiscalPeriodId, UserId};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Status of a fiscal period.
///
/// Periods move `Open -> Closing -> Closed`; `Closed` is terminal.
/// `Closing` is the transient lock state held while the closing entry is
/// computed and posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period is open for posting.
    Open,
    /// A close is in flight; new postings into the period are rejected.
    Closing,
    /// Period is closed, no posting allowed.
    Closed,
}

impl PeriodStatus {
    /// Returns true if the period accepts new postings from callers.
    #[must_use]
    pub fn allows_posting(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A fiscal period within the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Period name (e.g. "2026-01").
    pub name: String,
    /// Start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// End date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
    /// The caller that closed the period, once closed.
    pub closed_by: Option<UserId>,
    /// When the period was closed, once closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl FiscalPeriod {
    /// Creates a new open period.
    #[must_use]
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: FiscalPeriodId::new(),
            name: name.into(),
            start_date,
            end_date,
            status: PeriodStatus::Open,
            closed_by: None,
            closed_at: None,
        }
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if this period's date range overlaps another's.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// Transitions `Open -> Closing`.
    ///
    /// # Errors
    ///
    /// Returns `PeriodAlreadyClosed` if the period is closed and
    /// `PeriodClosing` if another close is already in flight.
    pub fn begin_close(&mut self) -> Result<(), LedgerError> {
        match self.status {
            PeriodStatus::Open => {
                self.status = PeriodStatus::Closing;
                Ok(())
            }
            PeriodStatus::Closing => Err(LedgerError::PeriodClosing(self.id)),
            PeriodStatus::Closed => Err(LedgerError::PeriodAlreadyClosed(self.id)),
        }
    }

    /// Transitions `Closing -> Closed`, recording who closed the period.
    pub fn complete_close(&mut self, closed_by: UserId) {
        debug_assert_eq!(self.status, PeriodStatus::Closing);
        self.status = PeriodStatus::Closed;
        self.closed_by = Some(closed_by);
        self.closed_at = Some(Utc::now());
    }

    /// Reverts `Closing -> Open` after a failed close.
    pub fn abort_close(&mut self) {
        debug_assert_eq!(self.status, PeriodStatus::Closing);
        self.status = PeriodStatus::Open;
    }
}
