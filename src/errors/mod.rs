/// Error handling for the reclaimer
///
/// `ReclaimError` is the umbrella type returned by engine operations. Leaf
/// errors live next to the code that produces them (`rpc::RpcError`,
/// `database::StoreError`) and convert into it. Submission failures are
/// per-account outcomes, not cycle errors.
pub mod blockchain;
pub use blockchain::*;

use crate::database::StoreError;
use crate::rpc::RpcError;

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Debug)]
pub enum ReclaimError {
    /// Chain RPC read failed (network outage, malformed response)
    Rpc(RpcError),

    /// Persistence collaborator failed
    Database(StoreError),

    /// Invalid or inconsistent configuration / operator identity
    Configuration(ConfigurationError),

    /// Data that cannot be interpreted (bad address, short account data)
    Data(DataError),

}

impl std::fmt::Display for ReclaimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReclaimError::Rpc(e) => write!(f, "RPC Error: {}", e),
            ReclaimError::Database(e) => write!(f, "Database Error: {}", e),
            ReclaimError::Configuration(e) => write!(f, "Configuration Error: {}", e),
            ReclaimError::Data(e) => write!(f, "Data Error: {}", e),
        }
    }
}

impl std::error::Error for ReclaimError {}

impl From<RpcError> for ReclaimError {
    fn from(err: RpcError) -> Self {
        ReclaimError::Rpc(err)
    }
}

impl From<StoreError> for ReclaimError {
    fn from(err: StoreError) -> Self {
        ReclaimError::Database(err)
    }
}

impl From<ConfigurationError> for ReclaimError {
    fn from(err: ConfigurationError) -> Self {
        ReclaimError::Configuration(err)
    }
}

impl From<DataError> for ReclaimError {
    fn from(err: DataError) -> Self {
        ReclaimError::Data(err)
    }
}

// =============================================================================
// CONFIGURATION ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum ConfigurationError {
    InvalidConfig { field: String, reason: String },
    InvalidPrivateKey { error: String },
    KeypairMismatch { expected: String, actual: String },
    FileNotFound { path: String },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::InvalidConfig { field, reason } => {
                write!(f, "Invalid config field '{}': {}", field, reason)
            }
            ConfigurationError::InvalidPrivateKey { error } => {
                write!(f, "Invalid private key: {}", error)
            }
            ConfigurationError::KeypairMismatch { expected, actual } => {
                write!(
                    f,
                    "Keypair mismatch: configured operator {} but keypair is {}",
                    expected, actual
                )
            }
            ConfigurationError::FileNotFound { path } => write!(f, "File not found: {}", path),
        }
    }
}

// =============================================================================
// DATA ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum DataError {
    InvalidAddress { address: String, error: String },
    TruncatedAccountData { address: String, len: usize, required: usize },
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::InvalidAddress { address, error } => {
                write!(f, "Invalid address '{}': {}", address, error)
            }
            DataError::TruncatedAccountData { address, len, required } => write!(
                f,
                "Token account {} data is {} bytes, layout needs {}",
                address, len, required
            ),
        }
    }
}
