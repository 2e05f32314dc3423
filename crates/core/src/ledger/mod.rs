//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Chart-of-accounts types and balance sign conventions
//! - Journal entries (debits and credits)
//! - Balance calculations and recomputation
//! - Business rule validation
//! - Domain types for entry creation
//! - Error types for ledger operations

pub mod account;
pub mod balance;
pub mod entry;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use account::{Account, AccountType};
pub use balance::{AccountBalance, recompute_balances};
pub use entry::{EntryStatus, JournalEntry, JournalLine};
pub use error::LedgerError;
pub use types::{
    BalanceSummary, EntryFilter, EntryTotals, NewJournalEntry, NewJournalLine, SourceType,
};
pub use validation::validate_entry;
