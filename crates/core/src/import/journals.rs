//! Journal inference from journal codes.

use crate::ledger::JournalType;

/// Prefix table: (code prefixes, journal type, default name).
const PREFIXES: [(&[&str], JournalType, &str); 7] = [
    (&["AN"], JournalType::Opening, "Journal des à-nouveaux"),
    (&["VT", "VE"], JournalType::Sale, "Journal des ventes"),
    (&["AC", "AH"], JournalType::Purchase, "Journal des achats"),
    (&["BQ", "BA"], JournalType::Bank, "Journal de banque"),
    (&["CA"], JournalType::Cash, "Journal de caisse"),
    (&["OD"], JournalType::Misc, "Opérations diverses"),
    (&["EX"], JournalType::Reversal, "Journal d'extourne"),
];

/// Infers the type and display name of a journal from its code.
///
/// Bank journals keep the code suffix in their name (`BQ1` → "Journal de
/// banque 1"). Unknown prefixes use `label` when given, else the code.
#[must_use]
pub fn infer_journal(code: &str, label: Option<&str>) -> (JournalType, String) {
    let upper = code.trim().to_uppercase();

    for (prefixes, journal_type, name) in PREFIXES {
        let Some(prefix) = prefixes.iter().find(|p| upper.starts_with(**p)) else {
            continue;
        };
        let name = if journal_type == JournalType::Bank {
            let suffix = upper[prefix.len()..].trim();
            if suffix.is_empty() {
                name.to_string()
            } else {
                format!("{name} {suffix}")
            }
        } else {
            name.to_string()
        };
        return (journal_type, name);
    }

    let name = label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map_or_else(|| code.trim().to_string(), str::to_string);
    (JournalType::Other, name)
}
