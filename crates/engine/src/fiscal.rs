//! Fiscal period store with a date-range index.
//!
//! Periods are looked up per entry date, never inferred from wall-clock
//! time. At most one period covers any given date; overlapping inserts are
//! rejected.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use saldo_core::fiscal::{FiscalPeriod, PeriodStatus};
use saldo_core::ledger::LedgerError;
use saldo_shared::types::{FiscalPeriodId, UserId};

/// Owns every fiscal period and its closing state.
pub struct PeriodStore {
    periods: RwLock<HashMap<FiscalPeriodId, FiscalPeriod>>,
}

impl Default for PeriodStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            periods: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodOverlap` if the date range intersects an existing
    /// period.
    pub fn insert(&self, period: FiscalPeriod) -> Result<FiscalPeriodId, LedgerError> {
        let mut periods = self.periods.write().map_err(|_| LedgerError::Conflict)?;
        if periods.values().any(|existing| existing.overlaps(&period)) {
            return Err(LedgerError::PeriodOverlap {
                start: period.start_date,
                end: period.end_date,
            });
        }
        let id = period.id;
        periods.insert(id, period);
        Ok(id)
    }

    /// Returns a snapshot of one period.
    pub fn get(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, LedgerError> {
        let periods = self.periods.read().map_err(|_| LedgerError::Conflict)?;
        periods
            .get(&id)
            .cloned()
            .ok_or(LedgerError::PeriodNotFound(id))
    }

    /// Returns the status of the period covering a date, if any.
    ///
    /// Dates with no covering period are unrestricted.
    pub fn status_for_date(&self, date: NaiveDate) -> Result<Option<PeriodStatus>, LedgerError> {
        let periods = self.periods.read().map_err(|_| LedgerError::Conflict)?;
        Ok(periods
            .values()
            .find(|p| p.contains_date(date))
            .map(|p| p.status))
    }

    /// Transitions a period `Open -> Closing`.
    pub fn begin_close(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, LedgerError> {
        let mut periods = self.periods.write().map_err(|_| LedgerError::Conflict)?;
        let period = periods
            .get_mut(&id)
            .ok_or(LedgerError::PeriodNotFound(id))?;
        period.begin_close()?;
        Ok(period.clone())
    }

    /// Transitions a period `Closing -> Closed`.
    pub fn complete_close(&self, id: FiscalPeriodId, closed_by: UserId) -> Result<(), LedgerError> {
        let mut periods = self.periods.write().map_err(|_| LedgerError::Conflict)?;
        let period = periods
            .get_mut(&id)
            .ok_or(LedgerError::PeriodNotFound(id))?;
        period.complete_close(closed_by);
        Ok(())
    }

    /// Reverts a period `Closing -> Open` after a failed close.
    pub fn abort_close(&self, id: FiscalPeriodId) -> Result<(), LedgerError> {
        let mut periods = self.periods.write().map_err(|_| LedgerError::Conflict)?;
        let period = periods
            .get_mut(&id)
            .ok_or(LedgerError::PeriodNotFound(id))?;
        period.abort_close();
        Ok(())
    }

    /// Lists all periods ordered by start date.
    pub fn list(&self) -> Result<Vec<FiscalPeriod>, LedgerError> {
        let periods = self.periods.read().map_err(|_| LedgerError::Conflict)?;
        let mut listed: Vec<FiscalPeriod> = periods.values().cloned().collect();
        listed.sort_by_key(|p| p.start_date);
        Ok(listed)
    }
}
