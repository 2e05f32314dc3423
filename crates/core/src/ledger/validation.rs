//! Business rule validation for journal entries.
//!
//! Validation runs before any mutation: a request that fails here leaves
//! no trace in the ledger.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryTotals, NewJournalEntry, NewJournalLine};

/// Validates a new journal entry and computes its totals.
///
/// Rules:
/// 1. The description must be non-empty.
/// 2. The entry must have at least 2 lines.
/// 3. Each line carries exactly one side: either a debit or a credit,
///    never both and never neither.
/// 4. Amounts must be non-negative.
/// 5. Total debits must equal total credits.
///
/// # Errors
///
/// Returns `LedgerError` naming the offending line (1-based) or the
/// unbalanced totals.
pub fn validate_entry(entry: &NewJournalEntry) -> Result<EntryTotals, LedgerError> {
    if entry.description.trim().is_empty() {
        return Err(LedgerError::EmptyDescription);
    }

    validate_lines(&entry.lines)
}

/// Validates a set of entry lines and computes their totals.
///
/// # Errors
///
/// Returns `LedgerError` if the lines violate any of the line rules.
pub fn validate_lines(lines: &[NewJournalLine]) -> Result<EntryTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    for (index, line) in lines.iter().enumerate() {
        let line_number = index + 1;

        if line.debit.is_sign_negative() || line.credit.is_sign_negative() {
            return Err(LedgerError::NegativeAmount(line_number));
        }

        let debit_zero = line.debit.is_zero();
        let credit_zero = line.credit.is_zero();

        if debit_zero && credit_zero {
            return Err(LedgerError::ZeroAmount(line_number));
        }
        if !debit_zero && !credit_zero {
            return Err(LedgerError::BothSides(line_number));
        }

        total_debit += line.debit;
        total_credit += line.credit;
    }

    let totals = EntryTotals::new(total_debit, total_credit);
    if !totals.is_balanced {
        return Err(LedgerError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}
