//! Spending ledger core.
//!
//! The ledger is a CSV file kept in a remote, versioned blob store. This
//! crate decodes it, appends to it with optimistic concurrency, computes the
//! daily and wallet budget figures, and drives the submission workflow.
//! It performs no I/O of its own: the remote is reached through
//! [`BlobStore`].

pub use category::{Category, DiscretionarySet};
pub use entry::Entry;
pub use error::EngineError;
pub use metrics::{Budget, DailyLevel, DailyStatus, WalletState, WalletStatus};
pub use money::MoneyCents;
pub use start_date::{ResolvedStartDate, StartDateSource};
pub use store::{
    BlobError, BlobStore, LedgerSnapshot, LedgerStore, MemoryBlobStore, RemoteFile, VersionToken,
};
pub use tracker::{
    Dashboard, Form, SkipReason, StatusKind, StatusMessage, SubmitOutcome, Tracker,
};

pub mod codec;
pub mod metrics;
pub mod start_date;
pub mod store;

mod category;
mod entry;
mod error;
mod money;
mod tracker;

pub type ResultEngine<T> = Result<T, EngineError>;
