//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur during ledger operations,
//! including validation errors, account errors, entry state errors, fiscal
//! period errors, and closing errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, FiscalPeriodId, JournalEntryId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry description is required.
    #[error("Entry description is required")]
    EmptyDescription,

    /// Entry must have at least 2 lines.
    #[error("Entry must have at least 2 lines")]
    InsufficientLines,

    /// Line must have either a debit or a credit amount.
    #[error("Line {0}: either debit or credit amount must be nonzero")]
    ZeroAmount(usize),

    /// Line cannot have both debit and credit amounts.
    #[error("Line {0}: cannot have both debit and credit amounts")]
    BothSides(usize),

    /// Line amounts cannot be negative.
    #[error("Line {0}: amounts cannot be negative")]
    NegativeAmount(usize),

    /// Entry is not balanced (debits != credits).
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// An account with the same code already exists.
    #[error("Account code already in use: {0}")]
    DuplicateAccountCode(String),

    // ========== Entry State Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Entry has already been posted.
    #[error("Entry {0} has already been posted")]
    AlreadyPosted(JournalEntryId),

    /// Entry has been voided.
    #[error("Entry {0} has been voided")]
    EntryVoided(JournalEntryId),

    /// Operation requires a posted entry.
    #[error("Entry {0} is not posted")]
    NotPosted(JournalEntryId),

    /// Closing entries are never voided directly.
    #[error("Entry {0} is a closing entry and cannot be voided")]
    CannotVoidClosing(JournalEntryId),

    // ========== Fiscal Period Errors ==========
    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Entry date falls in a closed fiscal period.
    #[error("Fiscal period covering {0} is closed, no posting allowed")]
    PeriodClosed(NaiveDate),

    /// Period overlaps an existing period.
    #[error("Period {start}..={end} overlaps an existing fiscal period")]
    PeriodOverlap {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    // ========== Closing Errors ==========
    /// Fiscal period is already closed.
    #[error("Fiscal period {0} is already closed")]
    PeriodAlreadyClosed(FiscalPeriodId),

    /// A close of this period is already in flight.
    #[error("Fiscal period {0} is currently closing")]
    PeriodClosing(FiscalPeriodId),

    /// The configured retained earnings account is missing.
    #[error("Retained earnings account ({0}) not found")]
    RetainedEarningsNotFound(String),

    /// The configured retained earnings account must be an equity account.
    #[error("Retained earnings account ({0}) is not an equity account")]
    RetainedEarningsNotEquity(String),

    // ========== Concurrency Errors ==========
    /// Lost a race on a locked resource.
    #[error("Concurrent modification detected, please retry")]
    Conflict,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::ZeroAmount(_) => "ZERO_AMOUNT",
            Self::BothSides(_) => "BOTH_SIDES",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::EntryVoided(_) => "ENTRY_VOIDED",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::CannotVoidClosing(_) => "CANNOT_VOID_CLOSING",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::PeriodOverlap { .. } => "PERIOD_OVERLAP",
            Self::PeriodAlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::PeriodClosing(_) => "PERIOD_CLOSING",
            Self::RetainedEarningsNotFound(_) => "RETAINED_EARNINGS_NOT_FOUND",
            Self::RetainedEarningsNotEquity(_) => "RETAINED_EARNINGS_NOT_EQUITY",
            Self::Conflict => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation and temporal lock errors
            Self::EmptyDescription
            | Self::InsufficientLines
            | Self::ZeroAmount(_)
            | Self::BothSides(_)
            | Self::NegativeAmount(_)
            | Self::Unbalanced { .. }
            | Self::AccountInactive(_)
            | Self::PeriodClosed(_)
            | Self::PeriodOverlap { .. }
            | Self::RetainedEarningsNotEquity(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_)
            | Self::EntryNotFound(_)
            | Self::PeriodNotFound(_)
            | Self::RetainedEarningsNotFound(_) => 404,

            // 409 Conflict - illegal transitions and lost races
            Self::DuplicateAccountCode(_)
            | Self::AlreadyPosted(_)
            | Self::EntryVoided(_)
            | Self::NotPosted(_)
            | Self::CannotVoidClosing(_)
            | Self::PeriodAlreadyClosed(_)
            | Self::PeriodClosing(_)
            | Self::Conflict => 409,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict | Self::PeriodClosing(_))
    }
}

impl From<LedgerError> for saldo_shared::AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.http_status_code() {
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Validation(message),
        }
    }
}
