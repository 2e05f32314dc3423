//! Account balance views and recomputation from first principles.

use std::collections::HashMap;

use rust_decimal::Decimal;
use saldo_shared::types::AccountId;
use serde::{Deserialize, Serialize};

use super::account::{Account, AccountType};
use super::entry::{EntryStatus, JournalEntry};

/// A read-only view of one account's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Current balance, signed per the type's normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Builds a view from an account.
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            balance: account.balance,
        }
    }
}

/// Recomputes every account balance from the full set of posted entries.
///
/// Non-posted entries are ignored. Every account in `account_types` appears
/// in the result, at zero if nothing posted against it. Lines referencing
/// accounts outside `account_types` are skipped.
#[must_use]
pub fn recompute_balances<'a>(
    account_types: &HashMap<AccountId, AccountType>,
    entries: impl IntoIterator<Item = &'a JournalEntry>,
) -> HashMap<AccountId, Decimal> {
    let mut balances: HashMap<AccountId, Decimal> = account_types
        .keys()
        .map(|id| (*id, Decimal::ZERO))
        .collect();

    for entry in entries {
        if entry.status != EntryStatus::Posted {
            continue;
        }
        for line in &entry.lines {
            let Some(account_type) = account_types.get(&line.account_id) else {
                continue;
            };
            if let Some(balance) = balances.get_mut(&line.account_id) {
                *balance += account_type.balance_change(line.debit, line.credit);
            }
        }
    }

    balances
}
