//! Ledger domain types for entry creation and queries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, UserId};
use serde::{Deserialize, Serialize};

use super::entry::EntryStatus;

/// Provenance of a journal entry.
///
/// Categorizes entries by what produced them so downstream code can branch
/// on origin without inspecting descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Hand-written general journal entry.
    Manual,
    /// Generated from a sales document.
    Sale,
    /// Generated from a purchase document.
    Purchase,
    /// Generated from a payment.
    Payment,
    /// Adjustment entry.
    Adjustment,
    /// Reversal of a previously posted entry.
    Reversal,
    /// Period-end closing entry.
    Closing,
}

impl SourceType {
    /// Returns true if entries of this source are synthesized by the system
    /// rather than drafted by a caller.
    #[must_use]
    pub const fn is_auto_generated(self) -> bool {
        !matches!(self, Self::Manual)
    }
}

/// Input for a single line of a new journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJournalLine {
    /// The account to post to.
    pub account_id: AccountId,
    /// Optional memo for this line.
    pub description: Option<String>,
    /// Debit amount (must be zero if `credit` is nonzero).
    pub debit: Decimal,
    /// Credit amount (must be zero if `debit` is nonzero).
    pub credit: Decimal,
}

impl NewJournalLine {
    /// Convenience constructor for a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            description: None,
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    /// Convenience constructor for a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            description: None,
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    /// Attaches a line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for creating a new journal entry.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    /// Provenance of the entry.
    pub source_type: SourceType,
    /// The date the entry belongs to.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// External reference string (empty if none).
    pub reference: Option<String>,
    /// The entry lines (must have at least 2).
    pub lines: Vec<NewJournalLine>,
    /// Post immediately after creation.
    pub auto_post: bool,
    /// The caller creating the entry.
    pub created_by: UserId,
}

/// Entry totals computed during validation.
#[derive(Debug, Clone)]
pub struct EntryTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the entry is balanced (debits == credits).
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates entry totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Filter by status.
    pub status: Option<EntryStatus>,
    /// Filter by source type.
    pub source_type: Option<SourceType>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
}

impl EntryFilter {
    /// Returns true if an entry with the given attributes passes the filter.
    #[must_use]
    pub fn matches(
        &self,
        status: EntryStatus,
        source_type: SourceType,
        entry_date: NaiveDate,
    ) -> bool {
        if self.status.is_some_and(|s| s != status) {
            return false;
        }
        if self.source_type.is_some_and(|s| s != source_type) {
            return false;
        }
        if self.date_from.is_some_and(|d| entry_date < d) {
            return false;
        }
        if self.date_to.is_some_and(|d| entry_date > d) {
            return false;
        }
        true
    }
}

/// Result of a full balance recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Number of accounts whose balances were rewritten.
    pub accounts_updated: usize,
    /// Number of posted entries scanned.
    pub entries_scanned: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_source_type_auto_generated() {
        assert!(!SourceType::Manual.is_auto_generated());
        assert!(SourceType::Sale.is_auto_generated());
        assert!(SourceType::Reversal.is_auto_generated());
        assert!(SourceType::Closing.is_auto_generated());
    }

    #[test]
    fn test_totals_balanced() {
        let totals = EntryTotals::new(dec!(100.00), dec!(100.00));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_totals_unbalanced() {
        let totals = EntryTotals::new(dec!(100.00), dec!(50.00));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(50.00));
    }

    #[test]
    fn test_line_constructors() {
        let account_id = AccountId::new();
        let line = NewJournalLine::debit(account_id, dec!(75)).with_description("Cash in");
        assert_eq!(line.debit, dec!(75));
        assert_eq!(line.credit, Decimal::ZERO);
        assert_eq!(line.description.as_deref(), Some("Cash in"));

        let line = NewJournalLine::credit(account_id, dec!(75));
        assert_eq!(line.debit, Decimal::ZERO);
        assert_eq!(line.credit, dec!(75));
    }

    #[test]
    fn test_filter_matches() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let filter = EntryFilter {
            status: Some(EntryStatus::Posted),
            source_type: None,
            date_from: Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            date_to: Some(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
        };

        assert!(filter.matches(EntryStatus::Posted, SourceType::Manual, date));
        assert!(!filter.matches(EntryStatus::Draft, SourceType::Manual, date));
        assert!(!filter.matches(
            EntryStatus::Posted,
            SourceType::Manual,
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
        ));
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let filter = EntryFilter::default();
        let date = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
        assert!(filter.matches(EntryStatus::Draft, SourceType::Closing, date));
        assert!(filter.matches(EntryStatus::Void, SourceType::Manual, date));
    }
}
