use std::process::ExitCode;

use chrono::Local;
use engine::{
    Budget, Category, LedgerStore, ResolvedStartDate, SkipReason, StartDateSource, SubmitOutcome,
    Tracker,
};

use crate::{
    client::Client,
    config::{AppConfig, Command, StartDateAction, TokenAction},
    error::{AppError, Result},
    local_state::LocalState,
    render,
};

pub async fn run(config: AppConfig, command: Command) -> Result<ExitCode> {
    let budget = config.budget()?;
    match command {
        Command::Categories => {
            print!("{}", render::categories(budget.discretionary()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Token { action } => token(&config, action),
        Command::Status => status(&config, budget).await,
        Command::Log {
            amount,
            category,
            note,
        } => log(&config, budget, &amount, &category, note.as_deref()).await,
        Command::StartDate { action } => {
            start_date_command(&config, budget, action.unwrap_or(StartDateAction::Show)).await
        }
    }
}

fn token(config: &AppConfig, action: TokenAction) -> Result<ExitCode> {
    let mut local = LocalState::load(&config.state_path)?;
    match action {
        TokenAction::Set { token } => {
            let token = token.trim();
            if token.is_empty() {
                eprintln!("token is empty");
                return Ok(ExitCode::FAILURE);
            }
            local.token = Some(token.to_string());
            local.save(&config.state_path)?;
            println!("Token saved to {}", config.state_path);
        }
        TokenAction::Clear => {
            local.token = None;
            local.save(&config.state_path)?;
            println!("Token cleared");
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Tracker wired to the remote ledger, plus the local state it was
/// seeded from.
fn open(config: &AppConfig, budget: Budget) -> Result<(Tracker<Client>, LocalState)> {
    config.validate_remote()?;
    let local = LocalState::load(&config.state_path)?;
    let token = config
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .or_else(|| local.token())
        .ok_or(AppError::MissingToken)?;

    let client = Client::new(config, token)?;
    let store = LedgerStore::new(client, config.csv_path.trim_matches('/'));
    let tracker = Tracker::new(store, budget, local.start_date());
    Ok((tracker, local))
}

/// Loads the ledger; prints the failure and returns `false` when it fails.
async fn load(tracker: &Tracker<Client>) -> bool {
    if tracker.load().await.is_ok() {
        return true;
    }
    if let Some(status) = tracker.take_status() {
        eprintln!("{}", status.text);
    }
    false
}

fn persist_start_date(
    config: &AppConfig,
    local: &mut LocalState,
    resolved: ResolvedStartDate,
) -> Result<()> {
    if resolved.needs_persist() {
        local.set_start_date(resolved.date);
        local.save(&config.state_path)?;
        tracing::info!("wallet start date set to {}", resolved.date);
    }
    Ok(())
}

async fn status(config: &AppConfig, budget: Budget) -> Result<ExitCode> {
    let (tracker, mut local) = open(config, budget)?;
    if !load(&tracker).await {
        return Ok(ExitCode::FAILURE);
    }

    let dashboard = tracker.dashboard(Local::now().date_naive());
    persist_start_date(config, &mut local, dashboard.start_date)?;
    print!("{}", render::dashboard(&dashboard));
    Ok(ExitCode::SUCCESS)
}

async fn log(
    config: &AppConfig,
    budget: Budget,
    amount: &str,
    category: &str,
    note: Option<&str>,
) -> Result<ExitCode> {
    let category: Category = match category.parse() {
        Ok(category) => category,
        Err(err) => {
            eprintln!("{err} (see `spendlog categories`)");
            return Ok(ExitCode::FAILURE);
        }
    };

    let (tracker, mut local) = open(config, budget)?;
    if !load(&tracker).await {
        return Ok(ExitCode::FAILURE);
    }

    tracker.set_amount(amount);
    tracker.select_category(category);
    tracker.set_note(note.unwrap_or_default());

    match tracker.submit().await {
        SubmitOutcome::Logged(_) => {
            if let Some(status) = tracker.take_status() {
                println!("{}\n", status.text);
            }
            let dashboard = tracker.dashboard(Local::now().date_naive());
            persist_start_date(config, &mut local, dashboard.start_date)?;
            print!("{}", render::dashboard(&dashboard));
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Failed(_) => {
            if let Some(status) = tracker.take_status() {
                eprintln!("{}", status.text);
            }
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::Skipped(SkipReason::Invalid(err)) => {
            eprintln!("Cannot log entry: {err}");
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::Skipped(SkipReason::InFlight) => {
            eprintln!("Another entry is being logged");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn start_date_command(
    config: &AppConfig,
    budget: Budget,
    action: StartDateAction,
) -> Result<ExitCode> {
    let today = Local::now().date_naive();
    let reset = matches!(action, StartDateAction::Reset);
    match action {
        StartDateAction::Set { date } => {
            let (tracker, mut local) = open(config, budget)?;
            let date = tracker.set_start_date(&date)?;
            local.set_start_date(date);
            local.save(&config.state_path)?;
            println!("Wallet start date: {date}");
            Ok(ExitCode::SUCCESS)
        }
        StartDateAction::Show | StartDateAction::Reset => {
            let (tracker, mut local) = open(config, budget)?;
            if !load(&tracker).await {
                return Ok(ExitCode::FAILURE);
            }
            let resolved = if reset {
                local.wallet_start_date = None;
                tracker.reset_start_date(today)
            } else {
                tracker.start_date(today)
            };
            persist_start_date(config, &mut local, resolved)?;
            println!(
                "Wallet start date: {} ({})",
                resolved.date,
                source_label(resolved.source)
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn source_label(source: StartDateSource) -> &'static str {
    match source {
        StartDateSource::Persisted => "stored",
        StartDateSource::EarliestEntry => "earliest entry",
        StartDateSource::Today => "today",
    }
}
