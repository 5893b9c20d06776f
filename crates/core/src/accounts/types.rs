//! Account domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use grandlivre_shared::types::{AccountId, CompanyId};

/// Statement category of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (classes 2, 3, 5 and receivables 41/42).
    Asset,
    /// Obligations (class 4 payables, long-term debt 16/17).
    Liability,
    /// Owner's resources (class 1 outside 16/17).
    Equity,
    /// Income (class 7).
    Revenue,
    /// Charges (class 6).
    Expense,
    /// Anything the registry cannot place (class 8, malformed numbers).
    Other,
}

impl AccountType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
            Self::Other => "other",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Returns the side on which this account type normally carries its balance.
    #[must_use]
    pub fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense | Self::Other => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }

    /// Returns true for accounts that appear on the balance sheet.
    #[must_use]
    pub fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Side on which an account's balance is normally positive.
///
/// - Asset/Expense: balance = debit - credit (debit-normal)
/// - Liability/Equity/Revenue: balance = credit - debit (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalSide {
    /// Debit-normal accounts.
    Debit,
    /// Credit-normal accounts.
    Credit,
}

impl NormalSide {
    /// Calculates the signed balance change for a debit/credit pair.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Result of classifying an account number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountClassification {
    /// Leading class digit, 0 when the number does not start with a digit.
    pub class: u8,
    /// Derived statement category.
    pub account_type: AccountType,
}

/// An account in a company's chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Account number, the classification key.
    pub number: String,
    /// Account name.
    pub name: String,
    /// Leading class digit.
    pub class: u8,
    /// Derived account type.
    pub account_type: AccountType,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Inactive accounts are kept for history but refuse new lines.
    pub is_active: bool,
}
