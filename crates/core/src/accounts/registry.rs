//! Account classification rules.
//!
//! Classification is a pure function of the account number:
//! - class 1: equity, except long-term debt (16, 17) which is a liability
//! - class 2, 3: asset
//! - class 4: asset for receivables (41, 42), liability otherwise
//! - class 5: asset
//! - class 6: expense
//! - class 7: revenue
//! - anything else: other

use super::types::{AccountClassification, AccountType};

/// Prefixes of long-term borrowings inside class 1.
const LONG_TERM_DEBT_PREFIXES: [&str; 2] = ["16", "17"];

/// Prefixes of class 4 accounts carried as assets.
const RECEIVABLE_PREFIXES: [&str; 2] = ["41", "42"];

/// Stateless classifier for account numbers.
pub struct AccountRegistry;

impl AccountRegistry {
    /// Returns the class digit of an account number, 0 if it does not start with a digit.
    #[must_use]
    pub fn class_of(number: &str) -> u8 {
        number
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or(0)
    }

    /// Classifies an account number. Never fails: malformed input is class 0 / other.
    #[must_use]
    pub fn classify(number: &str) -> AccountClassification {
        let number = number.trim();
        let class = Self::class_of(number);
        let account_type = match class {
            1 if Self::is_long_term_debt(number) => AccountType::Liability,
            1 => AccountType::Equity,
            2 | 3 | 5 => AccountType::Asset,
            4 if Self::has_prefix(number, &RECEIVABLE_PREFIXES) => AccountType::Asset,
            4 => AccountType::Liability,
            6 => AccountType::Expense,
            7 => AccountType::Revenue,
            _ => AccountType::Other,
        };

        AccountClassification {
            class,
            account_type,
        }
    }

    /// Returns true if the number belongs to the chart: starts with 1-8 and is all digits.
    #[must_use]
    pub fn is_valid_number(number: &str) -> bool {
        let number = number.trim();
        !number.is_empty()
            && number.chars().all(|c| c.is_ascii_digit())
            && (1..=8).contains(&Self::class_of(number))
    }

    /// Returns true for long-term borrowings (16x, 17x).
    #[must_use]
    pub fn is_long_term_debt(number: &str) -> bool {
        Self::has_prefix(number.trim(), &LONG_TERM_DEBT_PREFIXES)
    }

    /// Returns the SYSCOHADA label of a class.
    #[must_use]
    pub fn class_name(class: u8) -> Option<&'static str> {
        match class {
            1 => Some("Comptes de ressources durables"),
            2 => Some("Comptes d'actif immobilisé"),
            3 => Some("Comptes de stocks"),
            4 => Some("Comptes de tiers"),
            5 => Some("Comptes de trésorerie"),
            6 => Some("Comptes de charges des activités ordinaires"),
            7 => Some("Comptes de produits des activités ordinaires"),
            8 => Some("Comptes des autres charges et produits (HAO)"),
            _ => None,
        }
    }

    fn has_prefix(number: &str, prefixes: &[&str]) -> bool {
        prefixes.iter().any(|p| number.starts_with(p))
    }
}
