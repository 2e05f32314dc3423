//! Property tests for journal entry validation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, UserId};

use super::error::LedgerError;
use super::types::{NewJournalEntry, NewJournalLine, SourceType};
use super::validation::validate_entry;

fn make_entry(lines: Vec<NewJournalLine>) -> NewJournalEntry {
    NewJournalEntry {
        source_type: SourceType::Manual,
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        description: "Property test entry".to_string(),
        reference: None,
        lines,
        auto_post: false,
        created_by: UserId::new(),
    }
}

/// Strategy for generating positive amounts with 2 decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// **Property: pairwise-balanced entries always validate**
    ///
    /// *For any* set of amounts, an entry built from matching debit/credit
    /// pairs passes validation with equal totals, regardless of line count.
    #[test]
    fn prop_balanced_pairs_validate(
        amounts in prop::collection::vec(amount_strategy(), 1..10)
    ) {
        let mut lines = Vec::new();
        for amount in &amounts {
            lines.push(NewJournalLine::debit(AccountId::new(), *amount));
            lines.push(NewJournalLine::credit(AccountId::new(), *amount));
        }

        let totals = validate_entry(&make_entry(lines)).unwrap();
        prop_assert!(totals.is_balanced);

        let expected: Decimal = amounts.iter().sum();
        prop_assert_eq!(totals.debit, expected);
        prop_assert_eq!(totals.credit, expected);
    }

    /// **Property: any skewed total is rejected**
    ///
    /// *For any* balanced entry, adding an extra debit line breaks the
    /// balance and validation fails with the unbalanced totals.
    #[test]
    fn prop_skewed_totals_rejected(
        amounts in prop::collection::vec(amount_strategy(), 1..10),
        extra in amount_strategy(),
    ) {
        let mut lines = Vec::new();
        for amount in &amounts {
            lines.push(NewJournalLine::debit(AccountId::new(), *amount));
            lines.push(NewJournalLine::credit(AccountId::new(), *amount));
        }
        lines.push(NewJournalLine::debit(AccountId::new(), extra));

        let result = validate_entry(&make_entry(lines));
        prop_assert!(
            matches!(result, Err(LedgerError::Unbalanced { .. })),
            "expected Unbalanced error"
        );
    }

    /// **Property: validation is order-independent**
    ///
    /// *For any* balanced entry, shuffling the line order never changes the
    /// validation outcome or the computed totals.
    #[test]
    fn prop_validation_order_independent(
        amounts in prop::collection::vec(amount_strategy(), 1..8)
    ) {
        let mut lines = Vec::new();
        for amount in &amounts {
            lines.push(NewJournalLine::debit(AccountId::new(), *amount));
            lines.push(NewJournalLine::credit(AccountId::new(), *amount));
        }

        let forward = validate_entry(&make_entry(lines.clone())).unwrap();
        lines.reverse();
        let backward = validate_entry(&make_entry(lines)).unwrap();

        prop_assert_eq!(forward.debit, backward.debit);
        prop_assert_eq!(forward.credit, backward.credit);
    }

    /// **Property: a line carrying both sides always fails**
    ///
    /// *For any* otherwise balanced entry, injecting a both-sides line is
    /// rejected before totals are even considered.
    #[test]
    fn prop_both_sides_line_rejected(
        amount in amount_strategy(),
    ) {
        let lines = vec![
            NewJournalLine {
                account_id: AccountId::new(),
                description: None,
                debit: amount,
                credit: amount,
            },
            NewJournalLine::credit(AccountId::new(), amount),
        ];

        let result = validate_entry(&make_entry(lines));
        prop_assert!(matches!(result, Err(LedgerError::BothSides(1))));
    }
}
