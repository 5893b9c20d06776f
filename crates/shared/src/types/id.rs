//! Identifiers of ledger records.
//!
//! Companies, accounts, journals, entries and entry lines each get their own
//! UUID newtype, so an entry line cannot be attached to a journal id or a
//! balance keyed by an entry id. Ids are UUID v7 and sort in creation order
//! to the millisecond.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! ledger_id {
    ($name:ident, $record:literal) => {
        #[doc = concat!("Identifier of ", $record, ".")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            #[doc = concat!("Generates a fresh id for ", $record, ".")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps a UUID read back from storage or a file.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        /// Accepts the hyphenated or simple form; surrounding blanks are ignored.
        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

ledger_id!(CompanyId, "a company, the owner of one set of books");
ledger_id!(AccountId, "an account in a company's chart");
ledger_id!(JournalId, "a journal (sales, purchases, bank, ...)");
ledger_id!(EntryId, "a journal entry header");
ledger_id!(EntryLineId, "one debit or credit line of an entry");
