//! First day of budget accrual for the wallet.

use chrono::NaiveDate;

use crate::{EngineError, Entry, ResultEngine};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where a resolved start date came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartDateSource {
    /// Stored locally, by a previous resolution or by the user.
    Persisted,
    EarliestEntry,
    Today,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedStartDate {
    pub date: NaiveDate,
    pub source: StartDateSource,
}

impl ResolvedStartDate {
    /// A date not read from local storage must be stored so it stays put
    /// across sessions.
    #[must_use]
    pub fn needs_persist(&self) -> bool {
        self.source != StartDateSource::Persisted
    }
}

/// Persisted value if any, else the earliest entry date, else `today`.
#[must_use]
pub fn resolve_start_date(
    persisted: Option<NaiveDate>,
    ledger: &[Entry],
    today: NaiveDate,
) -> ResolvedStartDate {
    if let Some(date) = persisted {
        return ResolvedStartDate {
            date,
            source: StartDateSource::Persisted,
        };
    }
    match earliest_entry_date(ledger) {
        Some(date) => ResolvedStartDate {
            date,
            source: StartDateSource::EarliestEntry,
        },
        None => ResolvedStartDate {
            date: today,
            source: StartDateSource::Today,
        },
    }
}

#[must_use]
pub fn earliest_entry_date(ledger: &[Entry]) -> Option<NaiveDate> {
    ledger.iter().filter_map(Entry::date).min()
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_start_date(raw: &str) -> ResultEngine<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return Err(EngineError::InvalidDate(format!("expected YYYY-MM-DD, got {raw:?}")));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| EngineError::InvalidDate(format!("{raw:?}: {err}")))
}

#[must_use]
pub fn format_start_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
