//! The ledger engine facade.
//!
//! Wires the registry, journal store, posting engine, closing engine, and
//! closing history together and exposes the transport-agnostic operation
//! set. Callers supply plain data plus an opaque authenticated identity;
//! results come back as plain data or a typed [`LedgerError`].

use std::sync::{Arc, RwLock};

use chrono::{NaiveDate, Utc};
use saldo_core::closing::{ClosingPreview, ClosingRecord};
use saldo_core::fiscal::FiscalPeriod;
use saldo_core::ledger::balance::AccountBalance;
use saldo_core::ledger::entry::{EntryStatus, JournalEntry};
use saldo_core::ledger::types::{
    BalanceSummary, EntryFilter, NewJournalEntry, NewJournalLine, SourceType,
};
use saldo_core::ledger::{Account, AccountType, LedgerError};
use saldo_shared::LedgerConfig;
use saldo_shared::types::{AccountId, FiscalPeriodId, JournalEntryId, UserId};
use tracing::info;

use crate::closing::ClosingEngine;
use crate::fiscal::PeriodStore;
use crate::history::{ClosingHistory, LastClosingInfo};
use crate::journal::JournalStore;
use crate::posting::PostingEngine;
use crate::registry::AccountRegistry;

/// The double-entry ledger engine.
pub struct LedgerEngine {
    registry: Arc<AccountRegistry>,
    journal: Arc<JournalStore>,
    periods: Arc<PeriodStore>,
    posting: Arc<PostingEngine>,
    closing: ClosingEngine,
    history: Arc<ClosingHistory>,
    gate: Arc<RwLock<()>>,
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl LedgerEngine {
    /// Creates an engine with an empty chart of accounts.
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        let registry = Arc::new(AccountRegistry::new());
        let journal = Arc::new(JournalStore::new(
            Arc::clone(&registry),
            config.journal.reference_prefix.clone(),
        ));
        let periods = Arc::new(PeriodStore::new());
        let history = Arc::new(ClosingHistory::new());
        let gate = Arc::new(RwLock::new(()));
        let posting = Arc::new(PostingEngine::new(
            Arc::clone(&journal),
            Arc::clone(&registry),
            Arc::clone(&periods),
            Arc::clone(&gate),
        ));
        let closing = ClosingEngine::new(
            Arc::clone(&registry),
            Arc::clone(&journal),
            Arc::clone(&periods),
            Arc::clone(&posting),
            Arc::clone(&history),
            Arc::clone(&gate),
            config.closing.retained_earnings_code,
            config.closing.code_prefix,
        );

        Self {
            registry,
            journal,
            periods,
            posting,
            closing,
            history,
            gate,
        }
    }

    // ========== Chart of accounts ==========

    /// Adds an account to the chart.
    pub fn add_account(
        &self,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Result<Account, LedgerError> {
        let account = Account::new(code, name, account_type);
        let id = self.registry.insert(account)?;
        self.registry.get(id)
    }

    /// Retires an account from posting. Accounts referenced by entries are
    /// never deleted.
    pub fn deactivate_account(&self, id: AccountId) -> Result<(), LedgerError> {
        self.registry.deactivate(id)
    }

    /// Returns one account.
    pub fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.registry.get(id)
    }

    /// Returns all account balances ordered by account code.
    pub fn list_account_balances(&self) -> Result<Vec<AccountBalance>, LedgerError> {
        self.registry.list_balances()
    }

    // ========== Fiscal periods ==========

    /// Adds a fiscal period; overlapping ranges are rejected.
    pub fn add_period(
        &self,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<FiscalPeriod, LedgerError> {
        let period = FiscalPeriod::new(name, start_date, end_date);
        let id = self.periods.insert(period)?;
        self.periods.get(id)
    }

    /// Returns one fiscal period.
    pub fn get_period(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, LedgerError> {
        self.periods.get(id)
    }

    /// Lists all fiscal periods ordered by start date.
    pub fn list_periods(&self) -> Result<Vec<FiscalPeriod>, LedgerError> {
        self.periods.list()
    }

    // ========== Journal entries ==========

    /// Creates a journal entry, optionally posting it immediately.
    pub fn create_journal_entry(
        &self,
        new_entry: NewJournalEntry,
    ) -> Result<JournalEntry, LedgerError> {
        let entry = self.journal.create(&new_entry)?;
        if new_entry.auto_post {
            return self.posting.post(entry.id);
        }
        Ok(entry)
    }

    /// Posts a draft entry; the single authoritative Draft -> Posted path.
    pub fn post_journal_entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.posting.post(id)
    }

    /// Voids a posted entry, reversing its movements but keeping history.
    pub fn void_journal_entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.posting.void(id)
    }

    /// Creates and posts a reversal of a posted entry: same lines with
    /// debit and credit swapped, dated today.
    pub fn reverse_journal_entry(
        &self,
        id: JournalEntryId,
        description: impl Into<String>,
        created_by: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        let original = self.journal.get(id)?;
        match original.status {
            EntryStatus::Posted => {}
            EntryStatus::Draft => return Err(LedgerError::NotPosted(id)),
            EntryStatus::Void => return Err(LedgerError::EntryVoided(id)),
        }

        let lines = original
            .lines
            .iter()
            .map(|line| NewJournalLine {
                account_id: line.account_id,
                description: line
                    .description
                    .as_ref()
                    .map(|d| format!("Reversing: {d}")),
                debit: line.credit,
                credit: line.debit,
            })
            .collect();

        let reversal = self.create_journal_entry(NewJournalEntry {
            source_type: SourceType::Reversal,
            entry_date: Utc::now().date_naive(),
            description: description.into(),
            reference: Some(format!("REV-{}", original.entry_number)),
            lines,
            auto_post: true,
            created_by,
        })?;
        info!(
            original = %original.entry_number,
            reversal = %reversal.entry_number,
            "reversed entry"
        );
        Ok(reversal)
    }

    /// Returns one journal entry.
    pub fn get_entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.journal.get(id)
    }

    /// Lists journal entries matching the filter, newest first.
    pub fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<JournalEntry>, LedgerError> {
        self.journal.list(filter)
    }

    // ========== Balances ==========

    /// Recomputes every account balance from the posted entries, replacing
    /// stored state. Drift correction only; not part of the posting path.
    pub fn refresh_balances(&self) -> Result<BalanceSummary, LedgerError> {
        // Drain in-flight posts and hold them off for the whole rebuild.
        let _gate = self.gate.write().map_err(|_| LedgerError::Conflict)?;
        let posted = self.journal.posted()?;
        self.registry.recompute(&posted)
    }

    // ========== Fiscal closing ==========

    /// Closes a fiscal period, producing its closing record.
    pub fn close_fiscal_period(
        &self,
        period_id: FiscalPeriodId,
        closed_by: UserId,
        description: Option<String>,
    ) -> Result<ClosingRecord, LedgerError> {
        self.closing.close_period(period_id, closed_by, description)
    }

    /// Read-only preview of what closing the period would sweep.
    pub fn preview_closing(&self, period_id: FiscalPeriodId) -> Result<ClosingPreview, LedgerError> {
        self.closing.preview(period_id)
    }

    /// Lists all closings, newest first; empty if nothing was ever closed.
    pub fn list_closing_history(&self) -> Result<Vec<ClosingRecord>, LedgerError> {
        self.history.list()
    }

    /// Returns the most recent closing, if any.
    pub fn last_closing(&self) -> Result<Option<LastClosingInfo>, LedgerError> {
        self.history.last_closing()
    }
}
