use clap::{Parser, Subcommand};
use engine::{Budget, DiscretionarySet, EngineError, MoneyCents};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/spendlog.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    /// Branch to read and commit to; the repository default when unset.
    pub branch: Option<String>,
    pub csv_path: String,
    pub daily_target: String,
    pub discretionary: Vec<String>,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub state_path: String,
    /// Access token. Usually kept in the local state file instead.
    pub token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            owner: String::new(),
            repo: String::new(),
            branch: None,
            csv_path: "spending_log.csv".to_string(),
            daily_target: "80.00".to_string(),
            discretionary: DiscretionarySet::default()
                .iter()
                .map(ToString::to_string)
                .collect(),
            request_timeout_secs: 30,
            log_level: "info".to_string(),
            state_path: "config/spendlog_state.json".to_string(),
            token: None,
        }
    }
}

impl AppConfig {
    /// Daily target and discretionary categories, validated.
    pub fn budget(&self) -> std::result::Result<Budget, EngineError> {
        let target: MoneyCents = self.daily_target.parse().map_err(|err| {
            EngineError::InvalidConfig(format!("daily_target {:?}: {err}", self.daily_target))
        })?;
        let discretionary = DiscretionarySet::from_tags(&self.discretionary)
            .map_err(|err| EngineError::InvalidConfig(format!("discretionary: {err}")))?;
        Budget::new(target, discretionary)
    }

    /// Checks the settings needed to reach the remote ledger.
    pub fn validate_remote(&self) -> std::result::Result<(), EngineError> {
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "owner and repo must be set".to_string(),
            ));
        }
        if self.csv_path.trim().trim_matches('/').is_empty() {
            return Err(EngineError::InvalidConfig("csv_path is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
#[command(name = "spendlog", version, about = "Log spending to a CSV ledger kept in a GitHub repository")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override repository owner.
    #[arg(long)]
    owner: Option<String>,
    /// Override repository name.
    #[arg(long)]
    repo: Option<String>,
    /// Override ledger path inside the repository.
    #[arg(long)]
    csv_path: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show today's entries, the daily total and the wallet.
    Status,
    /// Log a new entry.
    Log {
        /// Amount, e.g. 12.50.
        amount: String,
        /// Category tag, e.g. GROCERIES (see `categories`).
        category: String,
        /// Free-text note.
        #[arg(long, short)]
        note: Option<String>,
    },
    /// List the categories; discretionary ones are marked.
    Categories,
    /// Show or change the wallet start date.
    StartDate {
        #[command(subcommand)]
        action: Option<StartDateAction>,
    },
    /// Manage the stored access token.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum StartDateAction {
    Show,
    /// Set the start date (YYYY-MM-DD).
    Set { date: String },
    /// Forget the stored date and derive it again from the ledger.
    Reset,
}

#[derive(Debug, Clone, Subcommand)]
pub enum TokenAction {
    Set { token: String },
    Clear,
}

pub fn load() -> Result<(AppConfig, Command)> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("SPENDLOG")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("discretionary"),
    );
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(owner) = args.owner {
        settings.owner = owner;
    }
    if let Some(repo) = args.repo {
        settings.repo = repo;
    }
    if let Some(csv_path) = args.csv_path {
        settings.csv_path = csv_path;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    Ok((settings, args.command.unwrap_or(Command::Status)))
}
