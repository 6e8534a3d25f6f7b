//! The module contains the `Entry` type, one row of the spending ledger.
use core::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

use crate::{Category, MoneyCents};

/// A single spending record. Entries are only ever appended, never edited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// ISO-8601 local time with its UTC offset, e.g. `2026-10-17T08:30:00-04:00`.
    pub timestamp: String,
    pub amount: MoneyCents,
    pub category: Category,
    pub note: String,
}

impl Entry {
    /// Creates an entry stamped with the given local time.
    pub fn new(
        at: DateTime<FixedOffset>,
        amount: MoneyCents,
        category: Category,
        note: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, false),
            amount,
            category,
            note: note.into(),
        }
    }

    /// Calendar date written in the entry's own timestamp.
    ///
    /// Falls back to the leading `YYYY-MM-DD` when the timestamp is not a
    /// full RFC 3339 value. `None` when no date can be read.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        if let Ok(at) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(at.date_naive());
        }
        self.timestamp
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.category)?;
        if !self.note.is_empty() {
            write!(f, " {}", self.note)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamp_keeps_local_offset() {
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2026, 10, 17, 23, 45, 9).unwrap();
        let entry = Entry::new(at, MoneyCents::new(1250), Category::Groceries, "milk");
        assert_eq!(entry.timestamp, "2026-10-17T23:45:09-04:00");
        assert_eq!(entry.date(), NaiveDate::from_ymd_opt(2026, 10, 17));
    }

    #[test]
    fn date_falls_back_to_prefix() {
        let entry = Entry {
            timestamp: "2026-01-02 lunch".to_string(),
            amount: MoneyCents::ZERO,
            category: Category::Other,
            note: String::new(),
        };
        assert_eq!(entry.date(), NaiveDate::from_ymd_opt(2026, 1, 2));

        let garbage = Entry {
            timestamp: "yesterday".to_string(),
            ..entry
        };
        assert_eq!(garbage.date(), None);
    }
}
