//! Lenient amount and date parsing for ledger exports.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses an amount as found in accounting exports.
///
/// Accepts `1234.56`, `1 234,56`, `1.234,56`, `1,234.56`, `(123.45)`
/// (negative) and strips currency symbols and codes. Blank input is zero.
///
/// # Returns
///
/// `None` when the text contains no digit or does not form a number.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    if !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut text: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+' | '(' | ')'))
        .collect();

    if text.starts_with('(') && text.ends_with(')') {
        text = format!("-{}", &text[1..text.len() - 1]);
    }

    let last_comma = text.rfind(',');
    let last_dot = text.rfind('.');
    let normalized = match (last_comma, last_dot) {
        // European: 1.234,56
        (Some(comma), Some(dot)) if comma > dot => text.replace('.', "").replace(',', "."),
        // Anglo-saxon: 1,234.56
        (Some(_), Some(_)) => text.replace(',', ""),
        (Some(comma), None) => {
            let decimals = text.len() - comma - 1;
            if text.matches(',').count() == 1 && decimals <= 2 {
                text.replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
        _ => text,
    };

    Decimal::from_str(&normalized).ok()
}

/// Parses a date in one of the formats found in exports.
///
/// `YYYYMMDD`, `YYYY-MM-DD`, `YYYY/MM/DD`, `DD/MM/YYYY`, `DD-MM-YYYY`
/// and `DD.MM.YYYY`. A time part after a space or `T` is ignored.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim().split([' ', 'T']).next()?.trim();
    if cleaned.is_empty() {
        return None;
    }

    if cleaned.len() == 8 && cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(cleaned, "%Y%m%d").ok();
    }

    ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cleaned, format).ok())
}
