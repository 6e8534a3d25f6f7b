use std::{fs, path::Path};

use chrono::NaiveDate;
use engine::start_date;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings kept on this machine between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LocalState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_start_date: Option<String>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes through a temp file so an interrupted save keeps the old state.
    pub fn save(&self, path: &str) -> Result<()> {
        let path = Path::new(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, payload)?;
        if fs::rename(&tmp, path).is_err() {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
        }
        Ok(())
    }

    /// Stored credential; blank values count as absent.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Stored start date. A malformed value is ignored.
    pub fn start_date(&self) -> Option<NaiveDate> {
        let raw = self.wallet_start_date.as_deref()?;
        match start_date::parse_start_date(raw) {
            Ok(date) => Some(date),
            Err(err) => {
                tracing::warn!("ignoring stored wallet start date: {err}");
                None
            }
        }
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.wallet_start_date = Some(start_date::format_start_date(date));
    }
}
