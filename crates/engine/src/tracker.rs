//! Entry submission workflow.
//!
//! [`Tracker`] owns the in-memory ledger, the input form and the submission
//! guard. It is the single actor driving the store: at most one submission
//! is in flight, and a call made while one is outstanding is a no-op.

use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

use crate::{
    BlobStore, Budget, Category, EngineError, Entry, LedgerStore, MoneyCents, ResultEngine,
    metrics::{self, DailyStatus, WalletStatus},
    start_date::{self, ResolvedStartDate},
};

/// User input for the next entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pub amount: String,
    pub category: Option<Category>,
    pub note: String,
}

impl Form {
    /// Amount and category, or why the form cannot be submitted.
    pub fn validate(&self) -> ResultEngine<(MoneyCents, Category)> {
        let amount: MoneyCents = self.amount.parse()?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be > 0, got {}",
                self.amount.trim()
            )));
        }
        match &self.category {
            Some(category) if category.is_selectable() => Ok((amount, category.clone())),
            Some(category) => Err(EngineError::UnknownCategory(category.to_string())),
            None => Err(EngineError::MissingCategory),
        }
    }

    /// Note as stored: trimmed, line breaks folded into spaces.
    #[must_use]
    pub fn normalized_note(&self) -> String {
        self.note
            .trim()
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Transient message for the user after a load or a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    fn success(text: String) -> Self {
        Self {
            kind: StatusKind::Success,
            text,
        }
    }

    fn error(text: String) -> Self {
        Self {
            kind: StatusKind::Error,
            text,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Another submission is still outstanding.
    InFlight,
    Invalid(EngineError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent to the remote.
    Skipped(SkipReason),
    Logged(Entry),
    /// The remote rejected the write; ledger and form are untouched.
    Failed(EngineError),
}

/// Everything the front end shows for a given day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub today: NaiveDate,
    /// Entries dated today, newest first.
    pub today_entries: Vec<Entry>,
    pub daily: DailyStatus,
    pub wallet: WalletStatus,
    pub start_date: ResolvedStartDate,
}

#[derive(Debug, Default)]
struct TrackerState {
    ledger: Vec<Entry>,
    loaded: bool,
    form: Form,
    status: Option<StatusMessage>,
    persisted_start: Option<NaiveDate>,
    start_date: Option<ResolvedStartDate>,
}

#[derive(Debug)]
pub struct Tracker<B> {
    store: LedgerStore<B>,
    budget: Budget,
    state: Mutex<TrackerState>,
    submitting: AtomicBool,
}

/// Clears the submitting flag when the submission ends, however it ends.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<B: BlobStore> Tracker<B> {
    /// `persisted_start` is the locally stored wallet start date, if any.
    pub fn new(store: LedgerStore<B>, budget: Budget, persisted_start: Option<NaiveDate>) -> Self {
        Self {
            store,
            budget,
            state: Mutex::new(TrackerState {
                persisted_start,
                ..TrackerState::default()
            }),
            submitting: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn store(&self) -> &LedgerStore<B> {
        &self.store
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        self.state().form.amount = amount.into();
    }

    pub fn select_category(&self, category: Category) {
        self.state().form.category = Some(category);
    }

    pub fn set_note(&self, note: impl Into<String>) {
        self.state().form.note = note.into();
    }

    #[must_use]
    pub fn form(&self) -> Form {
        self.state().form.clone()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Whether the submit action is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.state().form.validate().is_ok()
    }

    #[must_use]
    pub fn ledger(&self) -> Vec<Entry> {
        self.state().ledger.clone()
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusMessage> {
        self.state().status.clone()
    }

    pub fn take_status(&self) -> Option<StatusMessage> {
        self.state().status.take()
    }

    /// Replaces the in-memory ledger with the remote one.
    ///
    /// On failure the in-memory ledger is kept as it was.
    pub async fn load(&self) -> ResultEngine<usize> {
        match self.store.fetch_ledger().await {
            Ok(snapshot) => {
                let count = snapshot.entries.len();
                let mut state = self.state();
                state.ledger = snapshot.entries;
                state.loaded = true;
                Ok(count)
            }
            Err(err) => {
                self.state().status = Some(StatusMessage::error(format!(
                    "Failed to load entries: {err}"
                )));
                Err(err)
            }
        }
    }

    /// Submits the form, stamped with the current local time.
    pub async fn submit(&self) -> SubmitOutcome {
        self.submit_at(Local::now().fixed_offset()).await
    }

    /// Submits the form, stamped with `now`.
    pub async fn submit_at(&self, now: DateTime<FixedOffset>) -> SubmitOutcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("submission already in flight, ignoring");
            return SubmitOutcome::Skipped(SkipReason::InFlight);
        }
        let _guard = SubmitGuard(&self.submitting);

        let form = self.form();
        let (amount, category) = match form.validate() {
            Ok(valid) => valid,
            Err(err) => return SubmitOutcome::Skipped(SkipReason::Invalid(err)),
        };
        let entry = Entry::new(now, amount, category, form.normalized_note());

        if let Err(err) = self.write(&entry).await {
            tracing::warn!("submission of {entry} failed: {err}");
            self.state().status = Some(StatusMessage::error(format!("Failed: {err}")));
            return SubmitOutcome::Failed(err);
        }

        tracing::info!("logged {entry}");
        let mut state = self.state();
        state.ledger.push(entry.clone());
        state.form = Form::default();
        state.status = Some(StatusMessage::success(format!(
            "{} {} logged",
            entry.amount, entry.category
        )));
        SubmitOutcome::Logged(entry)
    }

    async fn write(&self, entry: &Entry) -> ResultEngine<()> {
        let snapshot = self.store.fetch_ledger().await?;
        self.store.append_entry(entry, &snapshot).await?;
        Ok(())
    }

    /// Wallet start date, resolved once and then cached.
    ///
    /// The resolution is not cached before the ledger has been loaded unless
    /// a persisted value exists.
    pub fn start_date(&self, today: NaiveDate) -> ResolvedStartDate {
        let mut state = self.state();
        if let Some(resolved) = state.start_date {
            return resolved;
        }
        let resolved = start_date::resolve_start_date(state.persisted_start, &state.ledger, today);
        if state.loaded || state.persisted_start.is_some() {
            state.start_date = Some(resolved);
        }
        resolved
    }

    /// Overrides the start date with a user-provided `YYYY-MM-DD` value.
    ///
    /// The caller persists the returned date.
    pub fn set_start_date(&self, raw: &str) -> ResultEngine<NaiveDate> {
        let date = start_date::parse_start_date(raw)?;
        let mut state = self.state();
        state.persisted_start = Some(date);
        state.start_date = Some(ResolvedStartDate {
            date,
            source: start_date::StartDateSource::Persisted,
        });
        Ok(date)
    }

    /// Forgets the stored start date and resolves it again from the ledger.
    pub fn reset_start_date(&self, today: NaiveDate) -> ResolvedStartDate {
        {
            let mut state = self.state();
            state.persisted_start = None;
            state.start_date = None;
        }
        self.start_date(today)
    }

    /// Recomputes the derived metrics for `today`.
    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        let start_date = self.start_date(today);
        let state = self.state();
        let mut today_entries: Vec<Entry> = state
            .ledger
            .iter()
            .filter(|entry| entry.date() == Some(today))
            .cloned()
            .collect();
        today_entries.reverse();

        Dashboard {
            today,
            today_entries,
            daily: metrics::daily_status(&state.ledger, today, &self.budget),
            wallet: metrics::wallet_status(&state.ledger, today, start_date.date, &self.budget),
            start_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_validation() {
        let mut form = Form::default();
        assert_eq!(form.validate(), Err(EngineError::InvalidAmount("empty amount".to_string())));

        form.amount = "0".to_string();
        assert!(matches!(form.validate(), Err(EngineError::InvalidAmount(_))));

        form.amount = "12.5".to_string();
        assert_eq!(form.validate(), Err(EngineError::MissingCategory));

        form.category = Some(Category::Unrecognized("PETS".to_string()));
        assert!(matches!(form.validate(), Err(EngineError::UnknownCategory(_))));

        form.category = Some(Category::Travel);
        assert_eq!(form.validate(), Ok((MoneyCents::new(1250), Category::Travel)));
    }

    #[test]
    fn note_is_trimmed_and_single_line() {
        let form = Form {
            note: "  dinner\r\n with   friends \n".to_string(),
            ..Form::default()
        };
        assert_eq!(form.normalized_note(), "dinner with   friends");
    }
}
