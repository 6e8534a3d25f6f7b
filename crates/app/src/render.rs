//! Plain-text rendering of the dashboard.

use std::fmt::Write;

use chrono::DateTime;
use engine::{
    Category, DailyLevel, DailyStatus, Dashboard, DiscretionarySet, Entry, WalletState,
    WalletStatus,
};

pub fn dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", dashboard.today.format("%A, %B %-d"));
    let _ = writeln!(out, "{}", daily_line(&dashboard.daily));
    let _ = writeln!(out, "{}", wallet_line(&dashboard.wallet));
    let _ = writeln!(out);

    if dashboard.today_entries.is_empty() {
        let _ = writeln!(out, "No entries today");
    }
    for entry in &dashboard.today_entries {
        let _ = writeln!(out, "{}", entry_line(entry));
    }
    out
}

pub fn daily_line(daily: &DailyStatus) -> String {
    let marker = match daily.level {
        DailyLevel::Normal => "",
        DailyLevel::Warning => " (warning)",
        DailyLevel::Over => " (over)",
    };
    format!("Today: {} of {}{marker}", daily.total, daily.target)
}

pub fn wallet_line(wallet: &WalletStatus) -> String {
    match wallet.state {
        WalletState::Funded { low } => format!(
            "Wallet: {}{} since {}",
            wallet.balance,
            if low { " (low)" } else { "" },
            wallet.start_date
        ),
        WalletState::Deficit {
            days_to_recover,
            recovery_date,
        } => format!(
            "Wallet: {} since {}, back to zero in {days_to_recover} day{} ({})",
            wallet.balance,
            wallet.start_date,
            if days_to_recover == 1 { "" } else { "s" },
            recovery_date.format("%a %b %-d")
        ),
    }
}

pub fn entry_line(entry: &Entry) -> String {
    let time = DateTime::parse_from_rfc3339(&entry.timestamp)
        .map(|at| at.format("%-I:%M %p").to_string())
        .unwrap_or_default();
    let mut line = format!("{time:>8}  {:<13} {:>9}", entry.category, entry.amount.to_string());
    if !entry.note.is_empty() {
        line.push_str("  ");
        line.push_str(&entry.note);
    }
    line
}

pub fn categories(discretionary: &DiscretionarySet) -> String {
    let mut out = String::new();
    for category in Category::SELECTABLE {
        let marker = if discretionary.contains(&category) { "*" } else { " " };
        let _ = writeln!(out, "{marker} {category}");
    }
    let _ = writeln!(out, "(* counts toward the daily target)");
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::MoneyCents;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_line_marks_level() {
        let daily = DailyStatus {
            total: MoneyCents::new(81_00),
            target: MoneyCents::new(80_00),
            level: DailyLevel::Over,
        };
        assert_eq!(daily_line(&daily), "Today: $81.00 of $80.00 (over)");
    }

    #[test]
    fn wallet_deficit_line() {
        let wallet = WalletStatus {
            start_date: day(2026, 10, 15),
            days_elapsed: 3,
            allowance: MoneyCents::new(240_00),
            spent: MoneyCents::new(300_00),
            balance: MoneyCents::new(-60_00),
            state: WalletState::Deficit {
                days_to_recover: 1,
                recovery_date: day(2026, 10, 18),
            },
        };
        assert_eq!(
            wallet_line(&wallet),
            "Wallet: -$60.00 since 2026-10-15, back to zero in 1 day (Sun Oct 18)"
        );
    }

    #[test]
    fn entry_line_shows_local_time() {
        let entry = Entry {
            timestamp: "2026-10-17T18:05:00-04:00".to_string(),
            amount: MoneyCents::new(12_50),
            category: Category::Groceries,
            note: "eggs".to_string(),
        };
        let line = entry_line(&entry);
        assert!(line.starts_with(" 6:05 PM  GROCERIES"), "{line}");
        assert!(line.ends_with("$12.50  eggs"), "{line}");
    }

    #[test]
    fn categories_mark_discretionary() {
        let out = categories(&DiscretionarySet::default());
        assert!(out.contains("* GROCERIES\n"));
        assert!(out.contains("  RENT\n"));
    }
}
