//! Account persistence
//!
//! `AccountStore` is the persistence collaborator used by the reclaim engine,
//! the discovery job and the stats report. `SqliteAccountStore` implements it
//! with rusqlite and also owns the durable `event_logs` sink.

mod accounts;
mod connection;
mod events;
pub mod models;

pub use connection::SqliteAccountStore;
pub use models::{
    AccountStatus, CandidateQuery, EventLevel, EventRecord, NewAccount, StatusUpdate,
    TrackedAccount,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare database location '{path}': {message}")]
    Location { path: String, message: String },

    #[error("failed to encode event metadata: {0}")]
    Meta(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator
///
/// Each call is independent; there is no multi-row transaction.
pub trait AccountStore: Send + Sync {
    /// MONITORING rows plus PROBATION rows checked before the cutoff,
    /// ordered by `created_at, address`
    fn select_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<TrackedAccount>>;

    /// Apply one transition. Returns `false` when no row changed (unknown
    /// address or an already RECLAIMED row).
    fn update_status(&self, address: &str, update: &StatusUpdate) -> StoreResult<bool>;

    fn count_by_status(&self, status: AccountStatus) -> StoreResult<u64>;

    /// Row count for every status, zero counts included
    fn status_breakdown(&self) -> StoreResult<Vec<(AccountStatus, u64)>>;

    /// Sum of `balance_lamports` over rows in `status`
    fn sum_balance_by_status(&self, status: AccountStatus) -> StoreResult<u64>;

    fn list_accounts(&self) -> StoreResult<Vec<TrackedAccount>>;

    fn get_account(&self, address: &str) -> StoreResult<Option<TrackedAccount>>;

    /// Insert a MONITORING row unless the address is already tracked
    fn insert_if_absent(&self, account: &NewAccount) -> StoreResult<bool>;

    fn append_event(
        &self,
        level: EventLevel,
        message: &str,
        meta: Option<&serde_json::Value>,
    ) -> StoreResult<()>;

    /// Newest first
    fn recent_events(&self, limit: usize) -> StoreResult<Vec<EventRecord>>;
}
