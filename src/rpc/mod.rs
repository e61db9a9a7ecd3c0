//! Chain RPC access
//!
//! `ChainRpc` is the narrow surface the reclaim engine needs from a Solana
//! node: account reads, blockhash fetch, submission and confirmation.
//! `SolanaRpc` implements it over `solana-client`; tests script it with
//! `testing::MockChain`.

pub mod client;
#[cfg(test)]
pub mod testing;

pub use client::SolanaRpc;

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use thiserror::Error;

use crate::errors::blockchain::{is_invalid_account_data, logs_indicate_invalid_account_data};

/// Result of waiting for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Reached the confirmed commitment level without error
    Confirmed,
    /// Landed on chain but the program rejected it
    Failed(TransactionError),
    /// Block height passed the blockhash validity window before confirmation
    Expired,
}

#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// Transport or node failure for a read/confirm call
    #[error("{method} failed: {message}")]
    Request { method: String, message: String },

    /// The node refused the transaction (usually preflight simulation)
    #[error("transaction rejected: {message}")]
    SendRejected {
        message: String,
        err: Option<TransactionError>,
        logs: Vec<String>,
    },
}

impl RpcError {
    pub fn request(method: &str, message: impl Into<String>) -> Self {
        RpcError::Request {
            method: method.to_string(),
            message: message.into(),
        }
    }

    /// The transaction referenced a blockhash the node no longer knows
    pub fn is_blockhash_not_found(&self) -> bool {
        match self {
            RpcError::SendRejected { err, message, .. } => {
                matches!(err, Some(TransactionError::BlockhashNotFound))
                    || (err.is_none() && message.contains("Blockhash not found"))
            }
            _ => false,
        }
    }

    /// The token program rejected the account as invalid data, the signal
    /// that a concurrent close already removed it. The typed error is
    /// preferred; program logs are the fallback.
    pub fn indicates_invalid_account_data(&self) -> bool {
        match self {
            RpcError::SendRejected { err, logs, .. } => {
                err.as_ref().map(is_invalid_account_data).unwrap_or(false)
                    || logs_indicate_invalid_account_data(logs)
            }
            _ => false,
        }
    }
}

/// Chain RPC collaborator used by the reclaim engine
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `None` when the account does not exist on chain
    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>, RpcError>;

    /// Latest blockhash and the last block height at which it is valid
    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), RpcError>;

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError>;

    /// Wait until the signature is confirmed, fails, or the blockhash expires
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &Hash,
        last_valid_block_height: u64,
    ) -> Result<ConfirmationOutcome, RpcError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::InstructionError;

    #[test]
    fn blockhash_not_found_detection() {
        let typed = RpcError::SendRejected {
            message: "Transaction simulation failed".to_string(),
            err: Some(TransactionError::BlockhashNotFound),
            logs: vec![],
        };
        assert!(typed.is_blockhash_not_found());

        let untyped = RpcError::SendRejected {
            message: "Transaction simulation failed: Blockhash not found".to_string(),
            err: None,
            logs: vec![],
        };
        assert!(untyped.is_blockhash_not_found());

        assert!(!RpcError::request("getLatestBlockhash", "timeout").is_blockhash_not_found());
    }

    #[test]
    fn invalid_account_data_prefers_typed_error() {
        let typed = RpcError::SendRejected {
            message: "simulation failed".to_string(),
            err: Some(TransactionError::InstructionError(0, InstructionError::InvalidAccountData)),
            logs: vec![],
        };
        assert!(typed.indicates_invalid_account_data());

        let logs_only = RpcError::SendRejected {
            message: "simulation failed".to_string(),
            err: None,
            logs: vec!["Program failed: invalid account data for instruction".to_string()],
        };
        assert!(logs_only.indicates_invalid_account_data());

        let other = RpcError::SendRejected {
            message: "simulation failed".to_string(),
            err: Some(TransactionError::InstructionError(0, InstructionError::Custom(11))),
            logs: vec![],
        };
        assert!(!other.indicates_invalid_account_data());
    }
}
