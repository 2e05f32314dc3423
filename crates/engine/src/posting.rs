//! Posting engine: the single authoritative Draft -> Posted transition.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use saldo_core::fiscal::PeriodStatus;
use saldo_core::ledger::LedgerError;
use saldo_core::ledger::entry::{EntryStatus, JournalEntry};
use saldo_core::ledger::types::SourceType;
use saldo_shared::types::JournalEntryId;
use tracing::{info, warn};

use crate::fiscal::PeriodStore;
use crate::journal::JournalStore;
use crate::registry::AccountRegistry;

/// Applies balanced entries to account balances, exactly once each.
pub struct PostingEngine {
    journal: Arc<JournalStore>,
    registry: Arc<AccountRegistry>,
    periods: Arc<PeriodStore>,
    /// Posting gate: every post holds a read guard for its whole duration;
    /// a period close (and a balance refresh) takes the write guard, which
    /// drains in-flight posts and blocks new ones.
    gate: Arc<RwLock<()>>,
}

impl PostingEngine {
    /// Creates a posting engine over the shared stores.
    #[must_use]
    pub fn new(
        journal: Arc<JournalStore>,
        registry: Arc<AccountRegistry>,
        periods: Arc<PeriodStore>,
        gate: Arc<RwLock<()>>,
    ) -> Self {
        Self {
            journal,
            registry,
            periods,
            gate,
        }
    }

    /// Posts a draft entry.
    ///
    /// Idempotent under retry: a second call for the same entry observes
    /// Posted and fails with `AlreadyPosted` without touching balances.
    pub fn post(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let _gate = self.gate.read().map_err(|_| LedgerError::Conflict)?;
        self.post_locked(id)
    }

    /// Posts while the caller already holds the gate (the closing engine
    /// posts the synthesized closing entry under the gate's write guard).
    pub(crate) fn post_locked(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let handle = self.journal.handle(id)?;
        let mut entry = handle.write().map_err(|_| LedgerError::Conflict)?;

        match entry.status {
            EntryStatus::Draft => {}
            EntryStatus::Posted => return Err(LedgerError::AlreadyPosted(id)),
            EntryStatus::Void => return Err(LedgerError::EntryVoided(id)),
        }

        if !entry.is_balanced() {
            return Err(LedgerError::Unbalanced {
                debit: entry.total_debit,
                credit: entry.total_credit,
            });
        }

        self.check_period(&entry)?;

        // All checks passed; apply every line as one indivisible unit. The
        // entry's write guard is held throughout, so a concurrent retry
        // blocks here and then observes Posted.
        self.registry.apply_movements(&entry.lines)?;

        entry.status = EntryStatus::Posted;
        entry.posted_at = Some(Utc::now());
        info!(
            entry = %entry.entry_number,
            date = %entry.entry_date,
            total = %entry.total_debit,
            "posted entry"
        );
        Ok(entry.clone())
    }

    /// Voids a posted entry, reversing its balance movements.
    ///
    /// History is preserved: the entry stays in the store as Void.
    pub fn void(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let _gate = self.gate.read().map_err(|_| LedgerError::Conflict)?;

        let handle = self.journal.handle(id)?;
        let mut entry = handle.write().map_err(|_| LedgerError::Conflict)?;

        match entry.status {
            EntryStatus::Posted => {}
            EntryStatus::Draft => return Err(LedgerError::NotPosted(id)),
            EntryStatus::Void => return Err(LedgerError::EntryVoided(id)),
        }
        if entry.source_type == SourceType::Closing {
            return Err(LedgerError::CannotVoidClosing(id));
        }

        // A closed period's balances are settled; voiding into it would
        // change them retroactively.
        self.check_period(&entry)?;

        self.registry.reverse_movements(&entry.lines)?;

        entry.status = EntryStatus::Void;
        entry.voided_at = Some(Utc::now());
        warn!(
            entry = %entry.entry_number,
            date = %entry.entry_date,
            total = %entry.total_debit,
            "voided entry"
        );
        Ok(entry.clone())
    }

    /// Rejects entries dated inside a closed period. A period mid-close
    /// (Closing) only admits its own synthesized closing entry.
    fn check_period(&self, entry: &JournalEntry) -> Result<(), LedgerError> {
        match self.periods.status_for_date(entry.entry_date)? {
            None | Some(PeriodStatus::Open) => Ok(()),
            Some(PeriodStatus::Closing) if entry.source_type == SourceType::Closing => Ok(()),
            Some(PeriodStatus::Closing | PeriodStatus::Closed) => {
                Err(LedgerError::PeriodClosed(entry.entry_date))
            }
        }
    }
}
