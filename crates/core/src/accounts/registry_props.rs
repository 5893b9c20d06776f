//! Property-based tests for AccountRegistry.

use proptest::prelude::*;

use super::registry::AccountRegistry;
use super::types::AccountType;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Classification is total: any string yields a class in 0..=9 and never panics.
    #[test]
    fn prop_classify_is_total(number in ".{0,12}") {
        let classification = AccountRegistry::classify(&number);
        prop_assert!(classification.class <= 9);
    }

    /// The type depends only on the leading digits, not on the rest of the number.
    #[test]
    fn prop_type_depends_on_prefix(prefix in "[1-8][0-9]", tail_a in "[0-9]{0,4}", tail_b in "[0-9]{0,4}") {
        let a = AccountRegistry::classify(&format!("{prefix}{tail_a}"));
        let b = AccountRegistry::classify(&format!("{prefix}{tail_b}"));
        prop_assert_eq!(a, b);
    }

    /// Class 6 and 7 never land on the balance sheet.
    #[test]
    fn prop_income_classes_off_balance_sheet(number in "[67][0-9]{1,5}") {
        let ty = AccountRegistry::classify(&number).account_type;
        prop_assert!(matches!(ty, AccountType::Expense | AccountType::Revenue));
        prop_assert!(!ty.is_balance_sheet());
    }
}
