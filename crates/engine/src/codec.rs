//! Text format of the ledger file.
//!
//! The first line is always [`HEADER`]; each following line is one entry:
//! `timestamp,amount,category,note`. Only the note is ever quoted.
//!
//! Decoding is lenient on purpose. A malformed row never aborts the parse,
//! it decodes field by field with these defaults:
//!
//! | field     | missing / unreadable                        |
//! |-----------|---------------------------------------------|
//! | timestamp | `""`                                        |
//! | amount    | numeric prefix, else `0` ([`MoneyCents::parse_lenient`]) |
//! | category  | [`Category::Unrecognized`] with the raw tag |
//! | note      | `""`                                        |

use crate::{Category, Entry, MoneyCents};

/// First line of every ledger file.
pub const HEADER: &str = "timestamp,amount,category,note";

/// Decodes the ledger text. The first non-blank line is the header and is
/// discarded; blank lines are skipped.
#[must_use]
pub fn parse(text: &str) -> Vec<Entry> {
    text.lines()
        .skip_while(|line| line.trim().is_empty())
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(parse_row)
        .collect()
}

/// Decodes a single data row, best effort.
#[must_use]
pub fn parse_row(line: &str) -> Entry {
    let mut fields = split_fields(line).into_iter();
    let timestamp = fields.next().unwrap_or_default();
    let amount_raw = fields.next().unwrap_or_default();
    let category_raw = fields.next().unwrap_or_default();
    let note = fields.next().unwrap_or_default();

    let amount = MoneyCents::parse_lenient(&amount_raw);
    if amount.is_zero() && !amount_raw.trim().is_empty() {
        tracing::debug!("ledger row with unreadable amount {amount_raw:?}, using 0");
    }

    Entry {
        timestamp,
        amount,
        category: Category::from_tag_lenient(&category_raw),
        note,
    }
}

/// Encodes one entry as a ledger line (without the trailing newline).
#[must_use]
pub fn serialize_row(entry: &Entry) -> String {
    format!(
        "{},{},{},{}",
        entry.timestamp,
        entry.amount.to_decimal_string(),
        entry.category.tag(),
        quote_note(&entry.note)
    )
}

fn quote_note(note: &str) -> String {
    if note.contains(',') || note.contains('"') {
        format!("\"{}\"", note.replace('"', "\"\""))
    } else {
        note.to_string()
    }
}

/// Splits a line on commas. A `"` toggles quoted mode, where commas are
/// literal and `""` stands for one `"`.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
