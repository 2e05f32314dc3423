//! Fiscal closing engine: period-end orchestration.
//!
//! Closing a period is all-or-nothing: the period flips to the transient
//! Closing state (a barrier against concurrent posting into it), the
//! closing entry is computed and posted, a closing record is persisted,
//! and the period lands in Closed. Any failure along the way reverts the
//! period to Open with balances untouched.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use saldo_core::closing::{ClosingPlan, ClosingPreview, ClosingRecord};
use saldo_core::fiscal::FiscalPeriod;
use saldo_core::ledger::types::{NewJournalEntry, SourceType};
use saldo_core::ledger::{Account, LedgerError};
use saldo_shared::types::{ClosingRecordId, FiscalPeriodId, JournalEntryId, UserId};
use tracing::{error, info};

use crate::fiscal::PeriodStore;
use crate::history::ClosingHistory;
use crate::journal::JournalStore;
use crate::posting::PostingEngine;
use crate::registry::AccountRegistry;

/// Orchestrates period-end closing.
pub struct ClosingEngine {
    registry: Arc<AccountRegistry>,
    journal: Arc<JournalStore>,
    periods: Arc<PeriodStore>,
    posting: Arc<PostingEngine>,
    history: Arc<ClosingHistory>,
    gate: Arc<RwLock<()>>,
    retained_earnings_code: String,
    code_prefix: String,
}

impl ClosingEngine {
    /// Creates a closing engine over the shared stores.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<AccountRegistry>,
        journal: Arc<JournalStore>,
        periods: Arc<PeriodStore>,
        posting: Arc<PostingEngine>,
        history: Arc<ClosingHistory>,
        gate: Arc<RwLock<()>>,
        retained_earnings_code: impl Into<String>,
        code_prefix: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            journal,
            periods,
            posting,
            history,
            gate,
            retained_earnings_code: retained_earnings_code.into(),
            code_prefix: code_prefix.into(),
        }
    }

    /// Closes a fiscal period.
    ///
    /// A period with zero swept activity still yields a zero-valued
    /// closing record, keeping the closing history contiguous per period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodAlreadyClosed` on a repeat close, `PeriodClosing` if
    /// a close is already in flight, and surfaces any failure from closing
    /// entry synthesis or posting after reverting the period to Open.
    pub fn close_period(
        &self,
        period_id: FiscalPeriodId,
        closed_by: UserId,
        description: Option<String>,
    ) -> Result<ClosingRecord, LedgerError> {
        // Flip to Closing first: from here on, new posts dated inside the
        // period are rejected by the posting engine's period check.
        let period = self.periods.begin_close(period_id)?;

        // Wait for in-flight posts to drain before reading balances, and
        // hold the gate so nothing moves while the closing entry posts.
        let close_result = match self.gate.write() {
            Ok(_gate) => self.execute(&period, closed_by, description),
            Err(_) => Err(LedgerError::Conflict),
        };

        match close_result {
            Ok(record) => {
                self.periods.complete_close(period_id, closed_by)?;
                self.history.push(record.clone())?;
                info!(
                    period = %period.name,
                    code = %record.code,
                    net_income = %record.net_income,
                    "closed fiscal period"
                );
                Ok(record)
            }
            Err(err) => {
                error!(period = %period.name, error = %err, "period close failed, reverting to open");
                self.periods.abort_close(period_id)?;
                Err(err)
            }
        }
    }

    /// Computes and posts the closing entry, then builds the record.
    fn execute(
        &self,
        period: &FiscalPeriod,
        closed_by: UserId,
        description: Option<String>,
    ) -> Result<ClosingRecord, LedgerError> {
        let retained_earnings = self.retained_earnings()?;
        let snapshot = self.registry.snapshot()?;
        let plan = ClosingPlan::compute(&snapshot, &retained_earnings)?;

        let description =
            description.unwrap_or_else(|| format!("Period closing {}", period.name));
        let code = format!("{}-{}", self.code_prefix, period.end_date);

        let entry_id = if plan.is_empty() {
            None
        } else {
            Some(self.post_closing_entry(period, &plan, &description, closed_by)?)
        };

        Ok(ClosingRecord {
            id: ClosingRecordId::new(),
            code,
            description,
            entry_date: period.end_date,
            entry_id,
            period_id: period.id,
            total_debit: plan.total_debit,
            total_credit: plan.total_credit,
            total_revenue: plan.total_revenue,
            total_expense: plan.total_expense,
            net_income: plan.net_income,
            closed_by,
            created_at: Utc::now(),
        })
    }

    /// Creates and posts the synthesized closing entry.
    ///
    /// The draft is removed again if posting fails, so a failed close
    /// leaves no trace in the journal.
    fn post_closing_entry(
        &self,
        period: &FiscalPeriod,
        plan: &ClosingPlan,
        description: &str,
        closed_by: UserId,
    ) -> Result<JournalEntryId, LedgerError> {
        let draft = self.journal.create(&NewJournalEntry {
            source_type: SourceType::Closing,
            entry_date: period.end_date,
            description: description.to_string(),
            reference: Some(format!("{}-{}", self.code_prefix, period.end_date)),
            lines: plan.lines.clone(),
            auto_post: false,
            created_by: closed_by,
        })?;

        match self.posting.post_locked(draft.id) {
            Ok(posted) => Ok(posted.id),
            Err(err) => {
                self.journal.remove_draft(draft.id)?;
                Err(err)
            }
        }
    }

    /// Read-only preview of what closing the period would sweep.
    pub fn preview(&self, period_id: FiscalPeriodId) -> Result<ClosingPreview, LedgerError> {
        let period = self.periods.get(period_id)?;
        let retained_earnings = self.retained_earnings()?;
        let snapshot = self.registry.snapshot()?;
        let plan = ClosingPlan::compute(&snapshot, &retained_earnings)?;

        Ok(ClosingPreview {
            period_id: period.id,
            start_date: period.start_date,
            end_date: period.end_date,
            total_revenue: plan.total_revenue,
            total_expense: plan.total_expense,
            net_income: plan.net_income,
            revenue_accounts: plan.revenue_accounts,
            expense_accounts: plan.expense_accounts,
            retained_earnings: retained_earnings.name,
        })
    }

    fn retained_earnings(&self) -> Result<Account, LedgerError> {
        self.registry
            .find_by_code(&self.retained_earnings_code)?
            .ok_or_else(|| {
                LedgerError::RetainedEarningsNotFound(self.retained_earnings_code.clone())
            })
    }
}
