//! End-to-end tests for the ledger engine.
//!
//! These tests drive the engine facade the way an external transport
//! would: set up a chart of accounts and periods, create and post
//! entries, close periods, and read balances and history back.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use saldo_core::ledger::entry::EntryStatus;
use saldo_core::ledger::types::{EntryFilter, NewJournalEntry, NewJournalLine, SourceType};
use saldo_core::ledger::{AccountType, LedgerError};
use saldo_engine::LedgerEngine;
use saldo_shared::LedgerConfig;
use saldo_shared::types::{AccountId, UserId};

fn test_engine() -> LedgerEngine {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    LedgerEngine::new(LedgerConfig::default())
}

struct Chart {
    cash: AccountId,
    receivables: AccountId,
    retained_earnings: AccountId,
    sales: AccountId,
    rent: AccountId,
}

fn setup_chart(engine: &LedgerEngine) -> Chart {
    Chart {
        cash: engine
            .add_account("1000", "Cash", AccountType::Asset)
            .unwrap()
            .id,
        receivables: engine
            .add_account("1200", "Accounts Receivable", AccountType::Asset)
            .unwrap()
            .id,
        retained_earnings: engine
            .add_account("3201", "Retained Earnings", AccountType::Equity)
            .unwrap()
            .id,
        sales: engine
            .add_account("4000", "Sales Revenue", AccountType::Revenue)
            .unwrap()
            .id,
        rent: engine
            .add_account("5100", "Rent Expense", AccountType::Expense)
            .unwrap()
            .id,
    }
}

fn january(engine: &LedgerEngine) -> saldo_core::fiscal::FiscalPeriod {
    engine
        .add_period(
            "2026-01",
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap()
}

fn manual_entry(
    debit_account: AccountId,
    credit_account: AccountId,
    amount: Decimal,
    day: u32,
) -> NewJournalEntry {
    NewJournalEntry {
        source_type: SourceType::Manual,
        entry_date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
        description: "Test entry".to_string(),
        reference: None,
        lines: vec![
            NewJournalLine::debit(debit_account, amount),
            NewJournalLine::credit(credit_account, amount),
        ],
        auto_post: false,
        created_by: UserId::new(),
    }
}

fn balance_of(engine: &LedgerEngine, id: AccountId) -> Decimal {
    engine.get_account(id).unwrap().balance
}

#[test]
fn test_create_post_and_read_balances() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    let created = engine
        .create_journal_entry(manual_entry(chart.cash, chart.sales, dec!(1000), 15))
        .unwrap();
    assert_eq!(created.status, EntryStatus::Draft);
    assert_eq!(created.total_debit, dec!(1000));
    assert_eq!(created.total_credit, dec!(1000));

    let posted = engine.post_journal_entry(created.id).unwrap();
    assert_eq!(posted.status, EntryStatus::Posted);

    assert_eq!(balance_of(&engine, chart.cash), dec!(1000));
    assert_eq!(balance_of(&engine, chart.sales), dec!(1000));

    // No period was closed; history stays empty.
    assert!(engine.list_closing_history().unwrap().is_empty());

    let balances = engine.list_account_balances().unwrap();
    let codes: Vec<&str> = balances.iter().map(|b| b.code.as_str()).collect();
    assert_eq!(codes, vec!["1000", "1200", "3201", "4000", "5100"]);
}

#[test]
fn test_auto_post_on_create() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    let mut entry = manual_entry(chart.cash, chart.sales, dec!(250), 10);
    entry.auto_post = true;
    let posted = engine.create_journal_entry(entry).unwrap();

    assert_eq!(posted.status, EntryStatus::Posted);
    assert_eq!(balance_of(&engine, chart.cash), dec!(250));
}

#[test]
fn test_unbalanced_entry_rejected_before_any_state() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    let result = engine.create_journal_entry(NewJournalEntry {
        source_type: SourceType::Manual,
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        description: "Unbalanced".to_string(),
        reference: None,
        lines: vec![
            NewJournalLine::debit(chart.cash, dec!(100)),
            NewJournalLine::credit(chart.sales, dec!(90)),
        ],
        auto_post: true,
        created_by: UserId::new(),
    });

    assert!(matches!(result, Err(LedgerError::Unbalanced { .. })));
    assert!(engine.list_entries(&EntryFilter::default()).unwrap().is_empty());
    assert_eq!(balance_of(&engine, chart.cash), Decimal::ZERO);
}

#[test]
fn test_unknown_account_rejected() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    let result = engine.create_journal_entry(NewJournalEntry {
        source_type: SourceType::Manual,
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        description: "Bad account".to_string(),
        reference: None,
        lines: vec![
            NewJournalLine::debit(chart.cash, dec!(100)),
            NewJournalLine::credit(AccountId::new(), dec!(100)),
        ],
        auto_post: false,
        created_by: UserId::new(),
    });

    assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
}

#[test]
fn test_full_closing_flow() {
    let engine = test_engine();
    let chart = setup_chart(&engine);
    let period = january(&engine);
    let closer = UserId::new();

    // Revenue: 1000 + 500, expense: 400.
    for (debit, credit, amount, day) in [
        (chart.cash, chart.sales, dec!(1000), 5),
        (chart.receivables, chart.sales, dec!(500), 12),
        (chart.rent, chart.cash, dec!(400), 20),
    ] {
        let mut entry = manual_entry(debit, credit, amount, day);
        entry.auto_post = true;
        engine.create_journal_entry(entry).unwrap();
    }

    let record = engine
        .close_fiscal_period(period.id, closer, None)
        .unwrap();

    assert_eq!(record.total_revenue, dec!(1500));
    assert_eq!(record.total_expense, dec!(400));
    assert_eq!(record.net_income, dec!(1100));
    assert_eq!(record.total_debit, record.total_credit);
    assert_eq!(record.total_debit, dec!(1900));
    assert_eq!(record.entry_date, period.end_date);
    assert_eq!(record.code, "PC-2026-01-31");
    assert_eq!(record.closed_by, closer);

    // Temporary accounts swept into retained earnings.
    assert_eq!(balance_of(&engine, chart.sales), Decimal::ZERO);
    assert_eq!(balance_of(&engine, chart.rent), Decimal::ZERO);
    assert_eq!(balance_of(&engine, chart.retained_earnings), dec!(1100));

    // The closing entry is a posted, Closing-sourced journal entry.
    let closing_entry = engine.get_entry(record.entry_id.unwrap()).unwrap();
    assert_eq!(closing_entry.source_type, SourceType::Closing);
    assert_eq!(closing_entry.status, EntryStatus::Posted);
    assert_eq!(closing_entry.entry_date, period.end_date);

    // The period is closed and blocks further posting inside it.
    let late = engine
        .create_journal_entry(manual_entry(chart.cash, chart.sales, dec!(100), 25))
        .unwrap();
    assert!(matches!(
        engine.post_journal_entry(late.id),
        Err(LedgerError::PeriodClosed(_))
    ));

    // Entries outside the period are unaffected.
    let february = engine
        .create_journal_entry(NewJournalEntry {
            entry_date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
            ..manual_entry(chart.cash, chart.sales, dec!(100), 1)
        })
        .unwrap();
    assert!(engine.post_journal_entry(february.id).is_ok());
}

#[test]
fn test_closing_is_exactly_once() {
    let engine = test_engine();
    let chart = setup_chart(&engine);
    let period = january(&engine);

    let mut entry = manual_entry(chart.cash, chart.sales, dec!(300), 8);
    entry.auto_post = true;
    engine.create_journal_entry(entry).unwrap();

    engine
        .close_fiscal_period(period.id, UserId::new(), None)
        .unwrap();
    let second = engine.close_fiscal_period(period.id, UserId::new(), None);

    assert!(matches!(second, Err(LedgerError::PeriodAlreadyClosed(_))));
    assert_eq!(engine.list_closing_history().unwrap().len(), 1);
}

#[test]
fn test_zero_activity_close_yields_zero_record() {
    let engine = test_engine();
    let _chart = setup_chart(&engine);
    let period = january(&engine);

    let record = engine
        .close_fiscal_period(period.id, UserId::new(), None)
        .unwrap();

    assert_eq!(record.total_debit, Decimal::ZERO);
    assert_eq!(record.total_credit, Decimal::ZERO);
    assert_eq!(record.net_income, Decimal::ZERO);
    assert!(record.entry_id.is_none());

    let closed = engine.get_period(period.id).unwrap();
    assert_eq!(closed.status, saldo_core::fiscal::PeriodStatus::Closed);

    // The zero record still shows up in history.
    assert_eq!(engine.list_closing_history().unwrap().len(), 1);
}

#[test]
fn test_failed_close_reverts_period_to_open() {
    let engine = test_engine();
    // Chart without the configured retained earnings account.
    let cash = engine
        .add_account("1000", "Cash", AccountType::Asset)
        .unwrap()
        .id;
    let sales = engine
        .add_account("4000", "Sales Revenue", AccountType::Revenue)
        .unwrap()
        .id;
    let period = january(&engine);

    let mut entry = manual_entry(cash, sales, dec!(100), 5);
    entry.auto_post = true;
    engine.create_journal_entry(entry).unwrap();

    let result = engine.close_fiscal_period(period.id, UserId::new(), None);
    assert!(matches!(
        result,
        Err(LedgerError::RetainedEarningsNotFound(_))
    ));

    // All-or-nothing: the period is open again and balances are untouched.
    let reverted = engine.get_period(period.id).unwrap();
    assert_eq!(reverted.status, saldo_core::fiscal::PeriodStatus::Open);
    assert_eq!(engine.get_account(sales).unwrap().balance, dec!(100));
    assert!(engine.list_closing_history().unwrap().is_empty());

    // Adding the account makes the same close succeed.
    engine
        .add_account("3201", "Retained Earnings", AccountType::Equity)
        .unwrap();
    assert!(engine
        .close_fiscal_period(period.id, UserId::new(), None)
        .is_ok());
}

#[test]
fn test_closing_history_newest_first() {
    let engine = test_engine();
    let chart = setup_chart(&engine);
    let closer = UserId::new();

    for (name, month) in [("2026-01", 1), ("2026-02", 2), ("2026-03", 3)] {
        let start = NaiveDate::from_ymd_opt(2026, month, 1).unwrap();
        let end = match month {
            1 | 3 => NaiveDate::from_ymd_opt(2026, month, 31).unwrap(),
            _ => NaiveDate::from_ymd_opt(2026, month, 28).unwrap(),
        };
        let period = engine.add_period(name, start, end).unwrap();

        let mut entry = manual_entry(chart.cash, chart.sales, dec!(100), 1);
        entry.entry_date = start;
        entry.auto_post = true;
        engine.create_journal_entry(entry).unwrap();

        engine.close_fiscal_period(period.id, closer, None).unwrap();
    }

    let history = engine.list_closing_history().unwrap();
    let months: Vec<u32> = history.iter().map(|r| r.entry_date.month()).collect();
    assert_eq!(months, vec![3, 2, 1]);

    let last = engine.last_closing().unwrap().unwrap();
    assert_eq!(
        last.last_closing_date,
        NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
    );
    assert_eq!(
        last.next_start_date,
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    );
}

#[test]
fn test_refresh_matches_incremental_balances() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    for (debit, credit, amount, day) in [
        (chart.cash, chart.sales, dec!(750), 3),
        (chart.receivables, chart.sales, dec!(1250), 9),
        (chart.rent, chart.cash, dec!(300), 17),
    ] {
        let mut entry = manual_entry(debit, credit, amount, day);
        entry.auto_post = true;
        engine.create_journal_entry(entry).unwrap();
    }
    // A draft that must not contribute to recomputed balances.
    engine
        .create_journal_entry(manual_entry(chart.cash, chart.sales, dec!(999), 21))
        .unwrap();

    let before = engine.list_account_balances().unwrap();
    let summary = engine.refresh_balances().unwrap();
    let after = engine.list_account_balances().unwrap();

    assert_eq!(summary.accounts_updated, 5);
    assert_eq!(summary.entries_scanned, 3);
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.account_id, a.account_id);
        assert_eq!(b.balance, a.balance, "balance drifted for {}", b.code);
    }
}

#[test]
fn test_void_restores_balances() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    let mut entry = manual_entry(chart.cash, chart.sales, dec!(800), 5);
    entry.auto_post = true;
    let posted = engine.create_journal_entry(entry).unwrap();

    let voided = engine.void_journal_entry(posted.id).unwrap();
    assert_eq!(voided.status, EntryStatus::Void);
    assert_eq!(balance_of(&engine, chart.cash), Decimal::ZERO);
    assert_eq!(balance_of(&engine, chart.sales), Decimal::ZERO);
}

#[test]
fn test_closing_entry_cannot_be_voided() {
    let engine = test_engine();
    let chart = setup_chart(&engine);
    let period = january(&engine);

    let mut entry = manual_entry(chart.cash, chart.sales, dec!(100), 5);
    entry.auto_post = true;
    engine.create_journal_entry(entry).unwrap();

    let record = engine
        .close_fiscal_period(period.id, UserId::new(), None)
        .unwrap();

    assert!(matches!(
        engine.void_journal_entry(record.entry_id.unwrap()),
        Err(LedgerError::CannotVoidClosing(_))
    ));
}

#[test]
fn test_reversal_cancels_original() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    let mut entry = manual_entry(chart.cash, chart.sales, dec!(450), 5);
    entry.auto_post = true;
    let posted = engine.create_journal_entry(entry).unwrap();

    let reversal = engine
        .reverse_journal_entry(posted.id, "Correction", UserId::new())
        .unwrap();

    assert_eq!(reversal.source_type, SourceType::Reversal);
    assert_eq!(reversal.status, EntryStatus::Posted);
    assert_eq!(reversal.reference, format!("REV-{}", posted.entry_number));
    assert_eq!(balance_of(&engine, chart.cash), Decimal::ZERO);
    assert_eq!(balance_of(&engine, chart.sales), Decimal::ZERO);
}

#[test]
fn test_reverse_requires_posted() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    let draft = engine
        .create_journal_entry(manual_entry(chart.cash, chart.sales, dec!(100), 5))
        .unwrap();
    assert!(matches!(
        engine.reverse_journal_entry(draft.id, "Correction", UserId::new()),
        Err(LedgerError::NotPosted(_))
    ));
}

#[test]
fn test_preview_does_not_mutate() {
    let engine = test_engine();
    let chart = setup_chart(&engine);
    let period = january(&engine);

    let mut entry = manual_entry(chart.cash, chart.sales, dec!(900), 5);
    entry.auto_post = true;
    engine.create_journal_entry(entry).unwrap();

    let preview = engine.preview_closing(period.id).unwrap();
    assert_eq!(preview.total_revenue, dec!(900));
    assert_eq!(preview.net_income, dec!(900));
    assert_eq!(preview.revenue_accounts, 1);
    assert_eq!(preview.retained_earnings, "Retained Earnings");

    // Nothing moved: the period is still open, balances intact.
    assert_eq!(
        engine.get_period(period.id).unwrap().status,
        saldo_core::fiscal::PeriodStatus::Open
    );
    assert_eq!(balance_of(&engine, chart.sales), dec!(900));
    assert!(engine.list_closing_history().unwrap().is_empty());
}

#[test]
fn test_list_entries_filters_and_orders() {
    let engine = test_engine();
    let chart = setup_chart(&engine);

    for day in [3, 17, 9] {
        let mut entry = manual_entry(chart.cash, chart.sales, dec!(10), day);
        entry.auto_post = true;
        engine.create_journal_entry(entry).unwrap();
    }
    engine
        .create_journal_entry(manual_entry(chart.cash, chart.sales, dec!(10), 28))
        .unwrap();

    let posted = engine
        .list_entries(&EntryFilter {
            status: Some(EntryStatus::Posted),
            ..EntryFilter::default()
        })
        .unwrap();
    let days: Vec<u32> = posted.iter().map(|e| e.entry_date.day()).collect();
    assert_eq!(days, vec![17, 9, 3]);
}

#[test]
fn test_overlapping_period_rejected() {
    let engine = test_engine();
    january(&engine);

    let result = engine.add_period(
        "overlap",
        NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
        NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
    );
    assert!(matches!(result, Err(LedgerError::PeriodOverlap { .. })));
}
