//! Versioned access to the remote ledger file.
//!
//! The remote is an opaque blob store keyed by path. Every read returns a
//! version token and every update must present the token it was based on,
//! so a write racing another writer is rejected instead of silently lost.
//! Appends always send the full accumulated content.

use std::{fmt, future::Future};

use thiserror::Error;

use crate::{
    Entry, EngineError, ResultEngine,
    codec::{self, HEADER},
};

pub use memory::MemoryBlobStore;

mod memory;

/// Opaque revision identifier of a remote file (a content hash on GitHub).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A remote file as last read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub content: String,
    pub version: VersionToken,
}

/// Failures reported by a [`BlobStore`]. "Not found" is not one of them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlobError {
    /// The expected version no longer matches the remote.
    #[error("{0}")]
    Conflict(String),
    /// Transport, auth, rate limit or server failure.
    #[error("{0}")]
    Remote(String),
}

impl From<BlobError> for EngineError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::Conflict(message) => EngineError::Conflict(message),
            BlobError::Remote(message) => EngineError::Remote(message),
        }
    }
}

/// Remote file-content API.
pub trait BlobStore {
    /// Reads the file at `path`; `Ok(None)` when it does not exist.
    fn read(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<RemoteFile>, BlobError>> + Send;

    /// Writes the full `content` of `path`.
    ///
    /// `expected` is the version the content was derived from, or `None` to
    /// create the file. Returns the new version.
    fn write(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected: Option<&VersionToken>,
    ) -> impl Future<Output = Result<VersionToken, BlobError>> + Send;
}

/// Decoded ledger together with the remote state it was read from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub entries: Vec<Entry>,
    file: Option<RemoteFile>,
}

impl LedgerSnapshot {
    /// Version of the file, `None` when the ledger does not exist yet.
    #[must_use]
    pub fn version(&self) -> Option<&VersionToken> {
        self.file.as_ref().map(|file| &file.version)
    }

    /// Raw content of the file, `None` when the ledger does not exist yet.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.file.as_ref().map(|file| file.content.as_str())
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.file.is_some()
    }
}

/// Read-then-append access to the ledger file at a fixed path.
#[derive(Debug)]
pub struct LedgerStore<B> {
    blob: B,
    path: String,
}

impl<B: BlobStore> LedgerStore<B> {
    pub fn new(blob: B, path: impl Into<String>) -> Self {
        Self {
            blob,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn blob(&self) -> &B {
        &self.blob
    }

    /// Fetches and decodes the ledger.
    ///
    /// A missing file yields an empty snapshot without version. Any other
    /// failure is an error and says nothing about the ledger.
    pub async fn fetch_ledger(&self) -> ResultEngine<LedgerSnapshot> {
        let file = self.blob.read(&self.path).await.map_err(|err| {
            tracing::error!("failed to read ledger {}: {err}", self.path);
            EngineError::from(err)
        })?;

        let Some(file) = file else {
            tracing::info!("ledger {} does not exist yet", self.path);
            return Ok(LedgerSnapshot::default());
        };

        let entries = codec::parse(&file.content);
        tracing::info!(
            "fetched ledger {} with {} entries at version {}",
            self.path,
            entries.len(),
            file.version
        );
        Ok(LedgerSnapshot {
            entries,
            file: Some(file),
        })
    }

    /// Appends `entry` to the ledger read in `base` with a conditional write.
    ///
    /// Fails with [`EngineError::Conflict`] when the remote moved past
    /// `base`; no retry or merge is attempted.
    pub async fn append_entry(
        &self,
        entry: &Entry,
        base: &LedgerSnapshot,
    ) -> ResultEngine<VersionToken> {
        let content = appended_content(base.content(), entry);
        let message = commit_message(entry);

        match self
            .blob
            .write(&self.path, &content, &message, base.version())
            .await
        {
            Ok(version) => {
                tracing::info!("appended to ledger {}, now at version {version}", self.path);
                Ok(version)
            }
            Err(BlobError::Conflict(message)) => {
                tracing::warn!("ledger {} changed remotely: {message}", self.path);
                Err(EngineError::Conflict(message))
            }
            Err(BlobError::Remote(message)) => {
                tracing::error!("failed to write ledger {}: {message}", self.path);
                Err(EngineError::Remote(message))
            }
        }
    }
}

/// Full file content after appending `entry`.
///
/// With no prior content (or a blank file) the content starts with the
/// header line.
#[must_use]
pub fn appended_content(prior: Option<&str>, entry: &Entry) -> String {
    let row = codec::serialize_row(entry);
    match prior {
        None => format!("{HEADER}\n{row}\n"),
        Some(prior) if prior.trim().is_empty() => format!("{HEADER}\n{row}\n"),
        Some(prior) if prior.ends_with('\n') => format!("{prior}{row}\n"),
        Some(prior) => format!("{prior}\n{row}\n"),
    }
}

/// Commit message recorded with each append.
#[must_use]
pub fn commit_message(entry: &Entry) -> String {
    format!("spending: {} {}", entry.amount, entry.category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, MoneyCents};

    fn entry() -> Entry {
        Entry {
            timestamp: "2026-10-17T08:00:00-04:00".to_string(),
            amount: MoneyCents::new(450),
            category: Category::Restaurants,
            note: "coffee".to_string(),
        }
    }

    #[test]
    fn new_file_starts_with_header_and_one_row() {
        let content = appended_content(None, &entry());
        assert_eq!(
            content,
            "timestamp,amount,category,note\n2026-10-17T08:00:00-04:00,4.50,RESTAURANTS,coffee\n"
        );
    }

    #[test]
    fn prior_content_is_newline_terminated_before_append() {
        let prior = "timestamp,amount,category,note\nrow-one";
        let content = appended_content(Some(prior), &entry());
        assert_eq!(
            content,
            "timestamp,amount,category,note\nrow-one\n2026-10-17T08:00:00-04:00,4.50,RESTAURANTS,coffee\n"
        );

        let terminated = format!("{prior}\n");
        assert_eq!(appended_content(Some(&terminated), &entry()), content);
    }

    #[test]
    fn blank_existing_file_gets_a_header() {
        assert_eq!(appended_content(Some(""), &entry()), appended_content(None, &entry()));
        assert_eq!(appended_content(Some("\n"), &entry()), appended_content(None, &entry()));
    }

    #[test]
    fn commit_message_names_amount_and_category() {
        assert_eq!(commit_message(&entry()), "spending: $4.50 RESTAURANTS");
    }
}
