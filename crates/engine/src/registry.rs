//! Account registry: the chart of accounts and its guarded balances.
//!
//! The balance map is the only hot shared-mutation point in the engine, so
//! the locking discipline lives here. The outer `RwLock` guards the shape
//! of the map (accounts added, deactivated, or wholesale recomputed); each
//! account carries its own inner `RwLock` so that postings touching
//! disjoint account sets proceed in parallel while postings touching the
//! same account serialize per account.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockWriteGuard};

use saldo_core::ledger::balance::{AccountBalance, recompute_balances};
use saldo_core::ledger::entry::{JournalEntry, JournalLine};
use saldo_core::ledger::types::BalanceSummary;
use saldo_core::ledger::{Account, AccountType, LedgerError};
use saldo_shared::types::AccountId;
use tracing::{debug, info};

struct Inner {
    accounts: HashMap<AccountId, RwLock<Account>>,
    by_code: HashMap<String, AccountId>,
}

/// The chart of accounts and each account's current balance.
pub struct AccountRegistry {
    inner: RwLock<Inner>,
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                accounts: HashMap::new(),
                by_code: HashMap::new(),
            }),
        }
    }

    /// Adds an account to the chart.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountCode` if the code is already in use.
    pub fn insert(&self, account: Account) -> Result<AccountId, LedgerError> {
        let mut inner = self.inner.write().map_err(|_| LedgerError::Conflict)?;
        if inner.by_code.contains_key(&account.code) {
            return Err(LedgerError::DuplicateAccountCode(account.code));
        }
        let id = account.id;
        inner.by_code.insert(account.code.clone(), id);
        inner.accounts.insert(id, RwLock::new(account));
        Ok(id)
    }

    /// Marks an account as no longer accepting postings.
    ///
    /// Accounts are never deleted while referenced by entries; deactivation
    /// is the only retirement path.
    pub fn deactivate(&self, id: AccountId) -> Result<(), LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::Conflict)?;
        let lock = inner
            .accounts
            .get(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        let mut account = lock.write().map_err(|_| LedgerError::Conflict)?;
        account.is_active = false;
        Ok(())
    }

    /// Returns a snapshot of one account.
    pub fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::Conflict)?;
        let lock = inner
            .accounts
            .get(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        let account = lock.read().map_err(|_| LedgerError::Conflict)?;
        Ok(account.clone())
    }

    /// Looks an account up by its chart code.
    pub fn find_by_code(&self, code: &str) -> Result<Option<Account>, LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::Conflict)?;
        let Some(id) = inner.by_code.get(code) else {
            return Ok(None);
        };
        let lock = inner
            .accounts
            .get(id)
            .ok_or(LedgerError::AccountNotFound(*id))?;
        let account = lock.read().map_err(|_| LedgerError::Conflict)?;
        Ok(Some(account.clone()))
    }

    /// Verifies that every line references a known, active account.
    ///
    /// Used at entry creation so malformed drafts are rejected before any
    /// state exists for them.
    pub fn check_lines(
        &self,
        accounts: impl IntoIterator<Item = AccountId>,
    ) -> Result<(), LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::Conflict)?;
        for id in accounts {
            let lock = inner
                .accounts
                .get(&id)
                .ok_or(LedgerError::AccountNotFound(id))?;
            let account = lock.read().map_err(|_| LedgerError::Conflict)?;
            if !account.is_active {
                return Err(LedgerError::AccountInactive(id));
            }
        }
        Ok(())
    }

    /// Applies every line of an entry to the balances as one indivisible unit.
    pub fn apply_movements(&self, lines: &[JournalLine]) -> Result<(), LedgerError> {
        self.apply(lines, false)
    }

    /// Reverses every line of an entry (used by void).
    pub fn reverse_movements(&self, lines: &[JournalLine]) -> Result<(), LedgerError> {
        self.apply(lines, true)
    }

    /// Applies all movements or none.
    ///
    /// Holds the outer read lock for the whole application and takes inner
    /// write locks in ascending account-ID order, so overlapping postings
    /// serialize per account without deadlocking while disjoint postings
    /// run in parallel. All validation happens before the first mutation.
    fn apply(&self, lines: &[JournalLine], reverse: bool) -> Result<(), LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::Conflict)?;

        let ids: BTreeSet<AccountId> = lines.iter().map(|l| l.account_id).collect();
        let mut guards: HashMap<AccountId, RwLockWriteGuard<'_, Account>> = HashMap::new();
        for id in ids {
            let lock = inner
                .accounts
                .get(&id)
                .ok_or(LedgerError::AccountNotFound(id))?;
            let guard = lock.write().map_err(|_| LedgerError::Conflict)?;
            if !guard.is_active {
                return Err(LedgerError::AccountInactive(id));
            }
            guards.insert(id, guard);
        }

        for line in lines {
            let account = guards
                .get_mut(&line.account_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            if reverse {
                account.apply_movement(line.credit, line.debit);
            } else {
                account.apply_movement(line.debit, line.credit);
            }
            debug!(
                account = %account.code,
                debit = %line.debit,
                credit = %line.credit,
                balance = %account.balance,
                reverse,
                "applied movement"
            );
        }

        Ok(())
    }

    /// Rebuilds every balance from the given posted entries and replaces
    /// stored state wholesale.
    ///
    /// Takes the outer write lock, so it is fully exclusive with concurrent
    /// postings. The caller is responsible for passing the complete set of
    /// posted entries.
    pub fn recompute(&self, entries: &[JournalEntry]) -> Result<BalanceSummary, LedgerError> {
        let inner = self.inner.write().map_err(|_| LedgerError::Conflict)?;

        let mut account_types: HashMap<AccountId, AccountType> =
            HashMap::with_capacity(inner.accounts.len());
        for (id, lock) in &inner.accounts {
            let account = lock.read().map_err(|_| LedgerError::Conflict)?;
            account_types.insert(*id, account.account_type);
        }

        let balances = recompute_balances(&account_types, entries);
        for (id, balance) in &balances {
            if let Some(lock) = inner.accounts.get(id) {
                let mut account = lock.write().map_err(|_| LedgerError::Conflict)?;
                account.balance = *balance;
            }
        }

        let summary = BalanceSummary {
            accounts_updated: balances.len(),
            entries_scanned: entries.len(),
        };
        info!(
            accounts = summary.accounts_updated,
            entries = summary.entries_scanned,
            "recomputed account balances"
        );
        Ok(summary)
    }

    /// Returns all balances ordered by account code.
    pub fn list_balances(&self) -> Result<Vec<AccountBalance>, LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::Conflict)?;
        let mut balances = Vec::with_capacity(inner.accounts.len());
        for lock in inner.accounts.values() {
            let account = lock.read().map_err(|_| LedgerError::Conflict)?;
            balances.push(AccountBalance::from_account(&account));
        }
        balances.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(balances)
    }

    /// Returns a snapshot of every account, ordered by code.
    pub fn snapshot(&self) -> Result<Vec<Account>, LedgerError> {
        let inner = self.inner.read().map_err(|_| LedgerError::Conflict)?;
        let mut accounts = Vec::with_capacity(inner.accounts.len());
        for lock in inner.accounts.values() {
            let account = lock.read().map_err(|_| LedgerError::Conflict)?;
            accounts.push(account.clone());
        }
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use saldo_shared::types::JournalLineId;

    fn make_line(account_id: AccountId, debit: Decimal, credit: Decimal) -> JournalLine {
        JournalLine {
            id: JournalLineId::new(),
            account_id,
            line_number: 1,
            description: None,
            debit,
            credit,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let registry = AccountRegistry::new();
        let id = registry
            .insert(Account::new("1000", "Cash", AccountType::Asset))
            .unwrap();

        let account = registry.get(id).unwrap();
        assert_eq!(account.code, "1000");
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let registry = AccountRegistry::new();
        registry
            .insert(Account::new("1000", "Cash", AccountType::Asset))
            .unwrap();
        assert!(matches!(
            registry.insert(Account::new("1000", "Petty Cash", AccountType::Asset)),
            Err(LedgerError::DuplicateAccountCode(_))
        ));
    }

    #[test]
    fn test_find_by_code() {
        let registry = AccountRegistry::new();
        registry
            .insert(Account::new("3201", "Retained Earnings", AccountType::Equity))
            .unwrap();

        let found = registry.find_by_code("3201").unwrap().unwrap();
        assert_eq!(found.name, "Retained Earnings");
        assert!(registry.find_by_code("9999").unwrap().is_none());
    }

    #[test]
    fn test_apply_movements() {
        let registry = AccountRegistry::new();
        let cash = registry
            .insert(Account::new("1000", "Cash", AccountType::Asset))
            .unwrap();
        let revenue = registry
            .insert(Account::new("4000", "Sales", AccountType::Revenue))
            .unwrap();

        registry
            .apply_movements(&[
                make_line(cash, dec!(1000), Decimal::ZERO),
                make_line(revenue, Decimal::ZERO, dec!(1000)),
            ])
            .unwrap();

        assert_eq!(registry.get(cash).unwrap().balance, dec!(1000));
        assert_eq!(registry.get(revenue).unwrap().balance, dec!(1000));
    }

    #[test]
    fn test_reverse_movements_undo_apply() {
        let registry = AccountRegistry::new();
        let cash = registry
            .insert(Account::new("1000", "Cash", AccountType::Asset))
            .unwrap();
        let revenue = registry
            .insert(Account::new("4000", "Sales", AccountType::Revenue))
            .unwrap();

        let lines = vec![
            make_line(cash, dec!(500), Decimal::ZERO),
            make_line(revenue, Decimal::ZERO, dec!(500)),
        ];
        registry.apply_movements(&lines).unwrap();
        registry.reverse_movements(&lines).unwrap();

        assert_eq!(registry.get(cash).unwrap().balance, Decimal::ZERO);
        assert_eq!(registry.get(revenue).unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_account_aborts_before_mutation() {
        let registry = AccountRegistry::new();
        let cash = registry
            .insert(Account::new("1000", "Cash", AccountType::Asset))
            .unwrap();

        let result = registry.apply_movements(&[
            make_line(cash, dec!(100), Decimal::ZERO),
            make_line(AccountId::new(), Decimal::ZERO, dec!(100)),
        ]);

        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
        // Nothing applied: validation precedes the first mutation.
        assert_eq!(registry.get(cash).unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_inactive_account_rejected() {
        let registry = AccountRegistry::new();
        let cash = registry
            .insert(Account::new("1000", "Cash", AccountType::Asset))
            .unwrap();
        let revenue = registry
            .insert(Account::new("4000", "Sales", AccountType::Revenue))
            .unwrap();
        registry.deactivate(revenue).unwrap();

        let result = registry.apply_movements(&[
            make_line(cash, dec!(100), Decimal::ZERO),
            make_line(revenue, Decimal::ZERO, dec!(100)),
        ]);

        assert!(matches!(result, Err(LedgerError::AccountInactive(_))));
        assert_eq!(registry.get(cash).unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_list_balances_ordered_by_code() {
        let registry = AccountRegistry::new();
        registry
            .insert(Account::new("4000", "Sales", AccountType::Revenue))
            .unwrap();
        registry
            .insert(Account::new("1000", "Cash", AccountType::Asset))
            .unwrap();
        registry
            .insert(Account::new("2000", "Payables", AccountType::Liability))
            .unwrap();

        let codes: Vec<String> = registry
            .list_balances()
            .unwrap()
            .into_iter()
            .map(|b| b.code)
            .collect();
        assert_eq!(codes, vec!["1000", "2000", "4000"]);
    }
}
