//! Journal entry store: the durable record of entries and their lines.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use saldo_core::ledger::entry::{EntryStatus, JournalEntry, JournalLine};
use saldo_core::ledger::types::{EntryFilter, NewJournalEntry};
use saldo_core::ledger::{LedgerError, validate_entry};
use saldo_shared::types::{JournalEntryId, JournalLineId};
use tracing::info;

use crate::registry::AccountRegistry;

/// Owns every journal entry; lines have no lifecycle of their own.
pub struct JournalStore {
    registry: Arc<AccountRegistry>,
    entries: RwLock<HashMap<JournalEntryId, Arc<RwLock<JournalEntry>>>>,
    sequence: AtomicU64,
    number_prefix: String,
}

impl JournalStore {
    /// Creates an empty store validating against the given registry.
    #[must_use]
    pub fn new(registry: Arc<AccountRegistry>, number_prefix: impl Into<String>) -> Self {
        Self {
            registry,
            entries: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            number_prefix: number_prefix.into(),
        }
    }

    fn next_entry_number(&self) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{n:06}", self.number_prefix)
    }

    /// Creates a draft entry.
    ///
    /// Validation runs before any state exists for the entry: malformed
    /// lines, unbalanced totals, and unknown or inactive accounts are all
    /// rejected here.
    pub fn create(&self, new_entry: &NewJournalEntry) -> Result<JournalEntry, LedgerError> {
        let totals = validate_entry(new_entry)?;
        self.registry
            .check_lines(new_entry.lines.iter().map(|l| l.account_id))?;

        let lines: Vec<JournalLine> = new_entry
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| JournalLine {
                id: JournalLineId::new(),
                account_id: line.account_id,
                line_number: u32::try_from(index + 1).unwrap_or(u32::MAX),
                description: line.description.clone(),
                debit: line.debit,
                credit: line.credit,
            })
            .collect();

        let entry = JournalEntry {
            id: JournalEntryId::new(),
            source_type: new_entry.source_type,
            entry_number: self.next_entry_number(),
            reference: new_entry.reference.clone().unwrap_or_default(),
            entry_date: new_entry.entry_date,
            description: new_entry.description.clone(),
            status: EntryStatus::Draft,
            total_debit: totals.debit,
            total_credit: totals.credit,
            created_by: new_entry.created_by,
            created_at: Utc::now(),
            posted_at: None,
            voided_at: None,
            lines,
        };

        let mut entries = self.entries.write().map_err(|_| LedgerError::Conflict)?;
        entries.insert(entry.id, Arc::new(RwLock::new(entry.clone())));
        info!(
            entry = %entry.entry_number,
            source = ?entry.source_type,
            total = %entry.total_debit,
            "created draft entry"
        );
        Ok(entry)
    }

    /// Returns a snapshot of one entry.
    pub fn get(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let handle = self.handle(id)?;
        let entry = handle.read().map_err(|_| LedgerError::Conflict)?;
        Ok(entry.clone())
    }

    /// Returns the shared handle for an entry, for lifecycle transitions.
    pub(crate) fn handle(
        &self,
        id: JournalEntryId,
    ) -> Result<Arc<RwLock<JournalEntry>>, LedgerError> {
        let entries = self.entries.read().map_err(|_| LedgerError::Conflict)?;
        entries
            .get(&id)
            .cloned()
            .ok_or(LedgerError::EntryNotFound(id))
    }

    /// Lists entries matching the filter, newest entry date first (ties
    /// broken by creation time, newest first).
    pub fn list(&self, filter: &EntryFilter) -> Result<Vec<JournalEntry>, LedgerError> {
        let entries = self.entries.read().map_err(|_| LedgerError::Conflict)?;
        let mut matched = Vec::new();
        for handle in entries.values() {
            let entry = handle.read().map_err(|_| LedgerError::Conflict)?;
            if filter.matches(entry.status, entry.source_type, entry.entry_date) {
                matched.push(entry.clone());
            }
        }
        matched.sort_by(|a, b| {
            b.entry_date
                .cmp(&a.entry_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(matched)
    }

    /// Removes a draft entry.
    ///
    /// Posted and voided entries are history and can never be removed.
    pub(crate) fn remove_draft(&self, id: JournalEntryId) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().map_err(|_| LedgerError::Conflict)?;
        let Some(handle) = entries.get(&id) else {
            return Err(LedgerError::EntryNotFound(id));
        };
        {
            let entry = handle.read().map_err(|_| LedgerError::Conflict)?;
            if entry.status != EntryStatus::Draft {
                return Err(LedgerError::AlreadyPosted(id));
            }
        }
        entries.remove(&id);
        Ok(())
    }

    /// Returns every posted entry, for balance recomputation.
    pub fn posted(&self) -> Result<Vec<JournalEntry>, LedgerError> {
        self.list(&EntryFilter {
            status: Some(EntryStatus::Posted),
            ..EntryFilter::default()
        })
    }
}
