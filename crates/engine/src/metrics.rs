//! Derived budget metrics.
//!
//! Pure functions over the in-memory ledger: nothing here touches the
//! remote or the clock, `today` is always passed in.

use chrono::{Days, NaiveDate};

use crate::{DiscretionarySet, EngineError, Entry, MoneyCents, ResultEngine};

/// Daily target and the categories it applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    target: MoneyCents,
    discretionary: DiscretionarySet,
}

impl Budget {
    /// Fails when `target` is not strictly positive.
    pub fn new(target: MoneyCents, discretionary: DiscretionarySet) -> ResultEngine<Self> {
        if !target.is_positive() {
            return Err(EngineError::InvalidConfig(format!(
                "daily target must be > 0, got {target}"
            )));
        }
        Ok(Self {
            target,
            discretionary,
        })
    }

    #[must_use]
    pub fn target(&self) -> MoneyCents {
        self.target
    }

    #[must_use]
    pub fn discretionary(&self) -> &DiscretionarySet {
        &self.discretionary
    }

    fn counts(&self, entry: &Entry) -> bool {
        self.discretionary.contains(&entry.category)
    }
}

/// How today's discretionary spend compares to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DailyLevel {
    Normal,
    /// Above three quarters of the target, not above the target.
    Warning,
    Over,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyStatus {
    pub total: MoneyCents,
    pub target: MoneyCents,
    pub level: DailyLevel,
}

/// Sum of today's discretionary entries.
#[must_use]
pub fn daily_total(ledger: &[Entry], today: NaiveDate, budget: &Budget) -> MoneyCents {
    ledger
        .iter()
        .filter(|entry| budget.counts(entry) && entry.date() == Some(today))
        .map(|entry| entry.amount)
        .sum()
}

#[must_use]
pub fn classify(total: MoneyCents, target: MoneyCents) -> DailyLevel {
    if total > target {
        DailyLevel::Over
    } else if i128::from(total.cents()) * 4 > i128::from(target.cents()) * 3 {
        DailyLevel::Warning
    } else {
        DailyLevel::Normal
    }
}

#[must_use]
pub fn daily_status(ledger: &[Entry], today: NaiveDate, budget: &Budget) -> DailyStatus {
    let total = daily_total(ledger, today, budget);
    DailyStatus {
        total,
        target: budget.target,
        level: classify(total, budget.target),
    }
}

/// Sign-dependent part of the wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletState {
    /// Non-negative balance; `low` when less than one day of target is left.
    Funded { low: bool },
    /// Negative balance and when it recovers with no further spending.
    Deficit {
        days_to_recover: u64,
        recovery_date: NaiveDate,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalletStatus {
    pub start_date: NaiveDate,
    /// Days from `start_date` to today, both included. Never below 1.
    pub days_elapsed: i64,
    pub allowance: MoneyCents,
    /// All-time discretionary spend.
    pub spent: MoneyCents,
    pub balance: MoneyCents,
    pub state: WalletState,
}

/// Cumulative allowance since `start_date` minus all discretionary spend.
#[must_use]
pub fn wallet_status(
    ledger: &[Entry],
    today: NaiveDate,
    start_date: NaiveDate,
    budget: &Budget,
) -> WalletStatus {
    let days_elapsed = ((today - start_date).num_days() + 1).max(1);
    let allowance = budget.target.times(days_elapsed);
    let spent: MoneyCents = ledger
        .iter()
        .filter(|entry| budget.counts(entry))
        .map(|entry| entry.amount)
        .sum();
    let balance = allowance - spent;

    let state = if balance.is_negative() {
        let deficit = balance.abs().cents().unsigned_abs();
        let target = budget.target.cents().unsigned_abs();
        let days_to_recover = deficit.div_ceil(target);
        let recovery_date = today
            .checked_add_days(Days::new(days_to_recover))
            .unwrap_or(NaiveDate::MAX);
        WalletState::Deficit {
            days_to_recover,
            recovery_date,
        }
    } else {
        WalletState::Funded {
            low: balance < budget.target,
        }
    };

    WalletStatus {
        start_date,
        days_elapsed,
        allowance,
        spent,
        balance,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    fn budget(target: i64) -> Budget {
        Budget::new(MoneyCents::new(target), DiscretionarySet::default()).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(timestamp: &str, cents: i64, category: Category) -> Entry {
        Entry {
            timestamp: timestamp.to_string(),
            amount: MoneyCents::new(cents),
            category,
            note: String::new(),
        }
    }

    #[test]
    fn budget_rejects_non_positive_target() {
        assert!(Budget::new(MoneyCents::ZERO, DiscretionarySet::default()).is_err());
        assert!(Budget::new(MoneyCents::new(-1), DiscretionarySet::default()).is_err());
    }

    #[test]
    fn daily_total_counts_only_today_and_discretionary() {
        let today = day(2026, 10, 17);
        let ledger = vec![
            entry("2026-10-17T08:00:00-04:00", 1000, Category::Groceries),
            entry("2026-10-17T23:59:00-04:00", 550, Category::Restaurants),
            entry("2026-10-17T09:00:00-04:00", 120000, Category::Rent),
            entry("2026-10-16T23:59:59-04:00", 4000, Category::Groceries),
            entry("2026-10-18T00:00:00-04:00", 4000, Category::Groceries),
            entry("garbage", 4000, Category::Groceries),
        ];
        assert_eq!(daily_total(&ledger, today, &budget(8000)).cents(), 1550);
    }

    #[test]
    fn classification_boundaries() {
        let target = MoneyCents::new(8000);
        assert_eq!(classify(MoneyCents::new(6000), target), DailyLevel::Normal);
        assert_eq!(classify(MoneyCents::new(6001), target), DailyLevel::Warning);
        assert_eq!(classify(MoneyCents::new(8000), target), DailyLevel::Warning);
        assert_eq!(classify(MoneyCents::new(8001), target), DailyLevel::Over);
        assert_eq!(classify(MoneyCents::ZERO, target), DailyLevel::Normal);
    }

    #[test]
    fn classification_with_fractional_three_quarters() {
        // 0.75 * 0.01 is not a whole number of cents.
        let target = MoneyCents::new(1);
        assert_eq!(classify(MoneyCents::ZERO, target), DailyLevel::Normal);
        assert_eq!(classify(MoneyCents::new(1), target), DailyLevel::Warning);
    }

    #[test]
    fn wallet_on_first_day_has_one_target() {
        let today = day(2026, 10, 17);
        let wallet = wallet_status(&[], today, today, &budget(8000));
        assert_eq!(wallet.days_elapsed, 1);
        assert_eq!(wallet.balance.cents(), 8000);
        assert_eq!(wallet.state, WalletState::Funded { low: false });
    }

    #[test]
    fn wallet_future_start_date_is_clamped() {
        let today = day(2026, 10, 17);
        let wallet = wallet_status(&[], today, day(2026, 11, 1), &budget(8000));
        assert_eq!(wallet.days_elapsed, 1);
        assert_eq!(wallet.allowance.cents(), 8000);
    }

    #[test]
    fn wallet_deficit_projects_recovery() {
        let today = day(2026, 10, 17);
        let ledger = vec![
            entry("2026-10-15T12:00:00-04:00", 10000, Category::Travel),
            entry("2026-10-16T12:00:00-04:00", 15000, Category::Shopping),
            entry("2026-10-17T12:00:00-04:00", 5000, Category::Groceries),
            entry("2026-10-17T12:00:00-04:00", 99999, Category::Bills),
        ];
        let wallet = wallet_status(&ledger, today, day(2026, 10, 15), &budget(8000));
        assert_eq!(wallet.days_elapsed, 3);
        assert_eq!(wallet.allowance.cents(), 24000);
        assert_eq!(wallet.spent.cents(), 30000);
        assert_eq!(wallet.balance.cents(), -6000);
        assert_eq!(
            wallet.state,
            WalletState::Deficit {
                days_to_recover: 1,
                recovery_date: day(2026, 10, 18),
            }
        );
    }

    #[test]
    fn wallet_deficit_rounds_recovery_up() {
        let today = day(2026, 10, 17);
        let ledger = vec![entry("2026-10-17T12:00:00Z", 24001, Category::Travel)];
        let wallet = wallet_status(&ledger, today, today, &budget(8000));
        assert_eq!(wallet.balance.cents(), -16001);
        assert_eq!(
            wallet.state,
            WalletState::Deficit {
                days_to_recover: 3,
                recovery_date: day(2026, 10, 20),
            }
        );
    }

    #[test]
    fn wallet_low_when_less_than_one_target_left() {
        let today = day(2026, 10, 17);
        let ledger = vec![entry("2026-10-16T12:00:00Z", 9000, Category::Restaurants)];
        let wallet = wallet_status(&ledger, today, day(2026, 10, 16), &budget(8000));
        assert_eq!(wallet.balance.cents(), 7000);
        assert_eq!(wallet.state, WalletState::Funded { low: true });

        let exact = wallet_status(&[], today, today, &budget(8000));
        assert_eq!(exact.state, WalletState::Funded { low: false });
    }

    #[test]
    fn wallet_counts_undated_discretionary_entries() {
        let today = day(2026, 10, 17);
        let ledger = vec![entry("???", 1000, Category::Groceries)];
        let wallet = wallet_status(&ledger, today, today, &budget(8000));
        assert_eq!(wallet.spent.cents(), 1000);
    }
}
