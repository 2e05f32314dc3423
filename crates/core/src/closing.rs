//! Period-end closing entry computation.
//!
//! A closing sweeps every temporary (revenue/expense) account balance into
//! the retained earnings equity account. The computation here is pure: it
//! takes a snapshot of account balances and produces the line set for the
//! closing journal entry plus the totals recorded in the closing history.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use saldo_shared::types::{ClosingRecordId, FiscalPeriodId, JournalEntryId, UserId};
use serde::{Deserialize, Serialize};

use crate::ledger::account::{Account, AccountType};
use crate::ledger::error::LedgerError;
use crate::ledger::types::NewJournalLine;

/// The computed plan for a closing journal entry.
#[derive(Debug, Clone)]
pub struct ClosingPlan {
    /// Lines for the closing entry, empty when nothing needs sweeping.
    pub lines: Vec<NewJournalLine>,
    /// Sum of revenue balances swept (signed).
    pub total_revenue: Decimal,
    /// Sum of expense balances swept (signed).
    pub total_expense: Decimal,
    /// `total_revenue - total_expense`.
    pub net_income: Decimal,
    /// Total debits across the plan lines.
    pub total_debit: Decimal,
    /// Total credits across the plan lines.
    pub total_credit: Decimal,
    /// Number of revenue accounts contributing lines.
    pub revenue_accounts: usize,
    /// Number of expense accounts contributing lines.
    pub expense_accounts: usize,
}

impl ClosingPlan {
    /// Computes the closing plan for a balance snapshot.
    ///
    /// Revenue accounts are zeroed from the debit side, expense accounts
    /// from the credit side, and the net result lands in retained earnings.
    /// An account whose balance has drifted to the abnormal side is zeroed
    /// from the opposite side, so the plan balances exactly without any
    /// absolute-value fudging. Zero balances contribute no lines.
    ///
    /// # Errors
    ///
    /// Returns `RetainedEarningsNotEquity` if the target account is not an
    /// equity account.
    pub fn compute(accounts: &[Account], retained_earnings: &Account) -> Result<Self, LedgerError> {
        if retained_earnings.account_type != AccountType::Equity {
            return Err(LedgerError::RetainedEarningsNotEquity(
                retained_earnings.code.clone(),
            ));
        }

        let mut lines = Vec::new();
        let mut total_revenue = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        let mut revenue_accounts = 0;
        let mut expense_accounts = 0;

        // Zero each revenue account: debit a normal (credit-side) balance,
        // credit one that drifted negative.
        for account in accounts {
            if account.account_type != AccountType::Revenue || account.balance.is_zero() {
                continue;
            }
            revenue_accounts += 1;
            total_revenue += account.balance;
            let line = if account.balance > Decimal::ZERO {
                NewJournalLine::debit(account.id, account.balance)
            } else {
                NewJournalLine::credit(account.id, -account.balance)
            };
            lines.push(line.with_description(format!("Close revenue account: {}", account.name)));
        }

        // Move total revenue into retained earnings.
        if total_revenue > Decimal::ZERO {
            lines.push(
                NewJournalLine::credit(retained_earnings.id, total_revenue)
                    .with_description("Transfer revenue to retained earnings"),
            );
        } else if total_revenue < Decimal::ZERO {
            lines.push(
                NewJournalLine::debit(retained_earnings.id, -total_revenue)
                    .with_description("Transfer revenue to retained earnings"),
            );
        }

        // Move total expense out of retained earnings.
        let expense_balances: Vec<&Account> = accounts
            .iter()
            .filter(|a| a.account_type == AccountType::Expense && !a.balance.is_zero())
            .collect();
        for account in &expense_balances {
            total_expense += account.balance;
        }
        if total_expense > Decimal::ZERO {
            lines.push(
                NewJournalLine::debit(retained_earnings.id, total_expense)
                    .with_description("Transfer expense from retained earnings"),
            );
        } else if total_expense < Decimal::ZERO {
            lines.push(
                NewJournalLine::credit(retained_earnings.id, -total_expense)
                    .with_description("Transfer expense from retained earnings"),
            );
        }

        // Zero each expense account: credit a normal (debit-side) balance,
        // debit one that drifted negative.
        for account in expense_balances {
            expense_accounts += 1;
            let line = if account.balance > Decimal::ZERO {
                NewJournalLine::credit(account.id, account.balance)
            } else {
                NewJournalLine::debit(account.id, -account.balance)
            };
            lines.push(line.with_description(format!("Close expense account: {}", account.name)));
        }

        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();

        Ok(Self {
            lines,
            total_revenue,
            total_expense,
            net_income: total_revenue - total_expense,
            total_debit,
            total_credit,
            revenue_accounts,
            expense_accounts,
        })
    }

    /// Returns true if there is nothing to sweep.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The persisted record of one period close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingRecord {
    /// Unique identifier.
    pub id: ClosingRecordId,
    /// Display code (e.g. "PC-2026-01-31").
    pub code: String,
    /// Description supplied by the closer.
    pub description: String,
    /// Entry date of the closing (the period end date).
    pub entry_date: NaiveDate,
    /// The generated closing journal entry; `None` for a zero-activity close.
    pub entry_id: Option<JournalEntryId>,
    /// The period this record closes.
    pub period_id: FiscalPeriodId,
    /// Total debits of the closing entry.
    pub total_debit: Decimal,
    /// Total credits of the closing entry.
    pub total_credit: Decimal,
    /// Revenue swept into retained earnings.
    pub total_revenue: Decimal,
    /// Expense swept out of retained earnings.
    pub total_expense: Decimal,
    /// `total_revenue - total_expense`.
    pub net_income: Decimal,
    /// The caller that closed the period.
    pub closed_by: UserId,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Read-only preview of what closing a period would do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingPreview {
    /// The period being previewed.
    pub period_id: FiscalPeriodId,
    /// Period start date.
    pub start_date: NaiveDate,
    /// Period end date.
    pub end_date: NaiveDate,
    /// Revenue that would be swept.
    pub total_revenue: Decimal,
    /// Expense that would be swept.
    pub total_expense: Decimal,
    /// Net result that would land in retained earnings.
    pub net_income: Decimal,
    /// Number of revenue accounts with balances to sweep.
    pub revenue_accounts: usize,
    /// Number of expense accounts with balances to sweep.
    pub expense_accounts: usize,
    /// Name of the retained earnings target account.
    pub retained_earnings: String,
}
