//! FEC (Fichier des Écritures Comptables) reader.
//!
//! The delimiter is detected from the first lines, header names are
//! matched case- and accent-insensitively, and `Montant` + `Sens` files are
//! normalized to debit/credit columns.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;

use super::error::FecError;
use super::types::FecRow;

const DELIMITERS: [u8; 4] = [b'|', b';', b'\t', b','];

/// Picks the delimiter occurring most often in the first three lines.
///
/// Ties go to the earlier candidate in `| ; \t ,`; no candidate gives `,`.
#[must_use]
pub fn detect_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(3).collect();
    let mut best = (b',', 0usize);
    for delimiter in DELIMITERS {
        let count: usize = sample
            .iter()
            .map(|line| line.bytes().filter(|b| *b == delimiter).count())
            .sum();
        if count > best.1 {
            best = (delimiter, count);
        }
    }
    best.0
}

/// Lowercases and drops everything but ASCII letters and digits; accented
/// vowels fold to their base letter.
fn normalize_header(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'à' | 'â' => 'a',
            'ô' => 'o',
            'ù' | 'û' => 'u',
            'î' | 'ï' => 'i',
            'ç' => 'c',
            other => other,
        })
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

#[derive(Debug, Default)]
struct Columns {
    journal_code: Option<usize>,
    journal_lib: Option<usize>,
    entry_number: Option<usize>,
    entry_date: Option<usize>,
    account_number: Option<usize>,
    account_lib: Option<usize>,
    piece_ref: Option<usize>,
    entry_lib: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    amount: Option<usize>,
    direction: Option<usize>,
    currency: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, FecError> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| names.iter().position(|n| n == alias))
        };

        let columns = Self {
            journal_code: find(&["journalcode", "codejournal", "journal"]),
            journal_lib: find(&["journallib", "libellejournal"]),
            entry_number: find(&["ecriturenum", "numecriture", "entrynumber"]),
            entry_date: find(&["ecrituredate", "dateecriture", "date"]),
            account_number: find(&["comptenum", "numcompte", "accountnumber", "compte"]),
            account_lib: find(&["comptelib", "libellecompte", "accountname"]),
            piece_ref: find(&["pieceref", "refpiece", "reference"]),
            entry_lib: find(&["ecriturelib", "libelle", "description"]),
            debit: find(&["debit", "montantdebit"]),
            credit: find(&["credit", "montantcredit"]),
            amount: find(&["montant"]),
            direction: find(&["sens"]),
            currency: find(&["idevise", "devise", "currency"]),
        };

        let required = [
            (columns.journal_code, "JournalCode"),
            (columns.entry_number, "EcritureNum"),
            (columns.entry_date, "EcritureDate"),
            (columns.account_number, "CompteNum"),
        ];
        if let Some((_, name)) = required.iter().find(|(index, _)| index.is_none()) {
            return Err(FecError::MissingColumn(*name));
        }

        let has_debit_credit = columns.debit.is_some() && columns.credit.is_some();
        let has_amount_direction = columns.amount.is_some() && columns.direction.is_some();
        if !has_debit_credit && !has_amount_direction {
            let missing = if columns.amount.is_some() {
                "Sens"
            } else if columns.debit.is_none() {
                "Debit"
            } else {
                "Credit"
            };
            return Err(FecError::MissingColumn(missing));
        }

        Ok(columns)
    }

    fn row(&self, record: &StringRecord) -> FecRow {
        let get = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(str::to_string)
                .unwrap_or_default()
        };

        let (debit, credit) = if self.debit.is_some() && self.credit.is_some() {
            (get(self.debit), get(self.credit))
        } else {
            let amount = get(self.amount);
            let direction = get(self.direction).to_lowercase();
            if direction.starts_with('c') || direction.starts_with('-') {
                (String::new(), amount)
            } else {
                (amount, String::new())
            }
        };

        FecRow {
            journal_code: get(self.journal_code),
            journal_lib: get(self.journal_lib),
            entry_number: get(self.entry_number),
            entry_date: get(self.entry_date),
            account_number: get(self.account_number),
            account_lib: get(self.account_lib),
            piece_ref: get(self.piece_ref),
            entry_lib: get(self.entry_lib),
            debit,
            credit,
            currency: Some(get(self.currency)).filter(|c| !c.is_empty()),
        }
    }
}

/// Parses FEC content.
///
/// # Errors
///
/// Returns `FecError::Empty` without a header, `FecError::MissingColumn`
/// when a mandatory column is absent and `FecError::Malformed` on CSV errors.
pub fn parse_fec(content: &str) -> Result<Vec<FecRow>, FecError> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Err(FecError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let columns = Columns::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(columns.row(&record));
    }
    Ok(rows)
}

/// Reads and parses FEC content from a reader.
///
/// # Errors
///
/// Same as [`parse_fec`], plus `FecError::Io` when reading fails.
pub fn read_fec(mut input: impl Read) -> Result<Vec<FecRow>, FecError> {
    let mut content = String::new();
    input.read_to_string(&mut content)?;
    parse_fec(&content)
}
