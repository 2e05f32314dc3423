//! Closing history: read-only retrieval of past period closings.

use std::sync::RwLock;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use saldo_core::closing::ClosingRecord;
use saldo_core::ledger::LedgerError;
use serde::{Deserialize, Serialize};

/// Summary of the most recent closing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastClosingInfo {
    /// End date of the last closed period.
    pub last_closing_date: NaiveDate,
    /// First date of the next period (day after the last close).
    pub next_start_date: NaiveDate,
    /// Net income of the last close.
    pub net_income: Decimal,
}

/// Append-only store of closing records.
pub struct ClosingHistory {
    records: RwLock<Vec<ClosingRecord>>,
}

impl Default for ClosingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ClosingHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Appends a record. Records are immutable after creation.
    pub(crate) fn push(&self, record: ClosingRecord) -> Result<(), LedgerError> {
        let mut records = self.records.write().map_err(|_| LedgerError::Conflict)?;
        records.push(record);
        Ok(())
    }

    /// Lists all closings, newest entry date first.
    ///
    /// Safe to call repeatedly; each call re-reads current state. Returns
    /// an empty list when no period has ever been closed.
    pub fn list(&self) -> Result<Vec<ClosingRecord>, LedgerError> {
        let records = self.records.read().map_err(|_| LedgerError::Conflict)?;
        let mut listed = records.clone();
        listed.sort_by(|a, b| {
            b.entry_date
                .cmp(&a.entry_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(listed)
    }

    /// Returns the most recent closing, if any.
    pub fn last_closing(&self) -> Result<Option<LastClosingInfo>, LedgerError> {
        let listed = self.list()?;
        Ok(listed.first().map(|record| LastClosingInfo {
            last_closing_date: record.entry_date,
            next_start_date: record
                .entry_date
                .checked_add_days(Days::new(1))
                .unwrap_or(record.entry_date),
            net_income: record.net_income,
        }))
    }
}
