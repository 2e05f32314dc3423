//! Journal entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, JournalEntryId, JournalLineId, UserId};
use serde::{Deserialize, Serialize};

use super::types::SourceType;

/// Journal entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and can be modified.
    Draft,
    /// Entry has been posted to the ledger (immutable).
    Posted,
    /// Entry has been voided (immutable).
    Void,
}

impl EntryStatus {
    /// Returns true if the entry can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the entry is immutable.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Posted | Self::Void)
    }
}

/// A single line in a journal entry.
///
/// Exactly one of `debit`/`credit` is nonzero; both are non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier for this line.
    pub id: JournalLineId,
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Position within the entry, starting at 1.
    pub line_number: u32,
    /// Optional description for this line item.
    pub description: Option<String>,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
}

impl JournalLine {
    /// Returns true if this line is on the debit side.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        !self.debit.is_zero()
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// A journal entry consisting of balanced lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Provenance of the entry.
    pub source_type: SourceType,
    /// Sequential entry number (e.g. "JE-000001").
    pub entry_number: String,
    /// External reference string (empty if none).
    pub reference: String,
    /// The date the entry belongs to (determines its fiscal period).
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Current status.
    pub status: EntryStatus,
    /// Total debit amount across all lines.
    pub total_debit: Decimal,
    /// Total credit amount across all lines.
    pub total_credit: Decimal,
    /// The caller that created the entry.
    pub created_by: UserId,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was posted, if it has been.
    pub posted_at: Option<DateTime<Utc>>,
    /// When the entry was voided, if it has been.
    pub voided_at: Option<DateTime<Utc>>,
    /// The entry's lines, ordered by line number.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Returns true if total debits equal total credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }

    /// Returns true if the entry can be posted.
    #[must_use]
    pub fn can_post(&self) -> bool {
        self.status == EntryStatus::Draft
    }

    /// Returns true if the entry can be voided.
    ///
    /// Closing entries are derived artifacts of a period close and are
    /// never voided directly.
    #[must_use]
    pub fn can_void(&self) -> bool {
        self.status == EntryStatus::Posted && self.source_type != SourceType::Closing
    }
}
