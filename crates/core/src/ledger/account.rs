//! Chart-of-accounts domain types and balance sign conventions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use saldo_shared::types::AccountId;
use serde::{Deserialize, Serialize};

/// Account classification.
///
/// The type determines the account's normal balance side:
/// - Asset/Expense are debit-normal: balance += debit - credit
/// - Liability/Equity/Revenue are credit-normal: balance += credit - debit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account (debit-normal).
    Asset,
    /// Liability account (credit-normal).
    Liability,
    /// Equity account (credit-normal).
    Equity,
    /// Revenue account (credit-normal).
    Revenue,
    /// Expense account (debit-normal).
    Expense,
}

impl AccountType {
    /// Returns true if this account type carries a normal debit balance.
    #[must_use]
    pub const fn is_debit_normal(self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }

    /// Calculates the balance change a movement causes on an account of this type.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        if self.is_debit_normal() {
            debit - credit
        } else {
            credit - debit
        }
    }

    /// Returns true if balances of this type are swept into equity at period close.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }
}

/// A chart-of-accounts entry with its running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Account code (e.g. "1000").
    pub code: String,
    /// Display name (e.g. "Cash").
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Current balance, signed per the type's normal side.
    pub balance: Decimal,
    /// Whether the account accepts new postings.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new active account with a zero balance.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: AccountId::new(),
            code: code.into(),
            name: name.into(),
            account_type,
            balance: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Applies a single movement to the running balance.
    pub fn apply_movement(&mut self, debit: Decimal, credit: Decimal) {
        self.balance += self.account_type.balance_change(debit, credit);
    }
}
