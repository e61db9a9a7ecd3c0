use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a tracked account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Monitoring,
    Probation,
    Reclaimed,
    Error,
    MarkedForDeath,
}

impl AccountStatus {
    pub const ALL: [AccountStatus; 5] = [
        AccountStatus::Monitoring,
        AccountStatus::Probation,
        AccountStatus::Reclaimed,
        AccountStatus::Error,
        AccountStatus::MarkedForDeath,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Monitoring => "MONITORING",
            AccountStatus::Probation => "PROBATION",
            AccountStatus::Reclaimed => "RECLAIMED",
            AccountStatus::Error => "ERROR",
            AccountStatus::MarkedForDeath => "MARKED_FOR_DEATH",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONITORING" => Ok(AccountStatus::Monitoring),
            "PROBATION" => Ok(AccountStatus::Probation),
            "RECLAIMED" => Ok(AccountStatus::Reclaimed),
            "ERROR" => Ok(AccountStatus::Error),
            "MARKED_FOR_DEATH" => Ok(AccountStatus::MarkedForDeath),
            other => Err(format!("unknown account status '{}'", other)),
        }
    }
}

/// One row of the `accounts` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAccount {
    pub address: String,
    pub owner_program: Option<String>,
    pub status: AccountStatus,
    pub balance_lamports: u64,
    pub last_active_at: Option<i64>,
    pub last_checked: Option<i64>,
    pub created_at: i64,
    pub reclaimed_at: Option<i64>,
    pub reclaim_tx_signature: Option<String>,
    pub error_log: Option<String>,
    /// Reserved, never incremented by the engine
    pub retry_count: u32,
    /// Reserved, never incremented by the engine
    pub tx_count: u32,
}

/// Fields written by one state-machine transition.
///
/// `None` leaves the stored column unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: AccountStatus,
    pub balance_lamports: Option<u64>,
    pub last_checked: Option<i64>,
    pub reclaimed_at: Option<i64>,
    pub reclaim_tx_signature: Option<String>,
    pub error_log: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: AccountStatus) -> Self {
        Self {
            status,
            balance_lamports: None,
            last_checked: None,
            reclaimed_at: None,
            reclaim_tx_signature: None,
            error_log: None,
        }
    }

    pub fn balance(mut self, lamports: u64) -> Self {
        self.balance_lamports = Some(lamports);
        self
    }

    pub fn checked_at(mut self, timestamp_ms: i64) -> Self {
        self.last_checked = Some(timestamp_ms);
        self
    }

    pub fn reclaimed_at(mut self, timestamp_ms: i64) -> Self {
        self.reclaimed_at = Some(timestamp_ms);
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.reclaim_tx_signature = Some(signature.into());
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error_log = Some(message.into());
        self
    }
}

/// Selection predicate inputs for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateQuery {
    /// Probation rows checked before this instant are due again
    pub probation_cutoff_ms: i64,
    pub limit: usize,
}

/// Row inserted by the discovery job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub address: String,
    pub owner_program: String,
    pub balance_lamports: u64,
    pub last_active_at: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl EventLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Info => "INFO",
            EventLevel::Success => "SUCCESS",
            EventLevel::Warning => "WARN",
            EventLevel::Error => "ERROR",
        }
    }
}

impl FromStr for EventLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(EventLevel::Info),
            "SUCCESS" => Ok(EventLevel::Success),
            "WARN" => Ok(EventLevel::Warning),
            "ERROR" => Ok(EventLevel::Error),
            other => Err(format!("unknown event level '{}'", other)),
        }
    }
}

/// One row of the `event_logs` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub level: EventLevel,
    pub message: String,
    pub meta: Option<serde_json::Value>,
    pub timestamp_ms: i64,
}
