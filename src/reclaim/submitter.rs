//! Close-transaction submission with blockhash-expiry recovery
//!
//! The only code path that mutates chain state. One attempt is: fetch a
//! blockhash, sign a single `CloseAccount` instruction paying the residual
//! lamports to the operator, send, and wait for "confirmed". Expired
//! blockhashes are retried after a fixed backoff; on-chain execution errors
//! are not.

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{DEFAULT_MAX_RETRIES, RETRY_BACKOFF_MS};
use crate::errors::blockchain::{is_invalid_account_data, parse_transaction_error};
use crate::logger::{self, LogTag};
use crate::rpc::{ChainRpc, ConfirmationOutcome, RpcError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPolicy {
    /// Total attempts, each with a fresh blockhash
    pub max_retries: u32,
    /// Fixed wait between attempts
    pub backoff: Duration,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(RETRY_BACKOFF_MS),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error("failed to build close instruction: {0}")]
    Build(String),

    #[error("{0}")]
    Rpc(#[from] RpcError),

    #[error("transaction {signature} failed on chain: {}", parse_transaction_error(.err))]
    Execution {
        signature: String,
        err: TransactionError,
    },

    #[error("blockhash expired before confirmation ({attempts} attempt(s))")]
    BlockhashExpired { attempts: u32 },
}

impl SubmitError {
    /// The token program reported invalid account data, either from
    /// preflight simulation or on-chain execution
    pub fn is_invalid_account_data(&self) -> bool {
        match self {
            SubmitError::Rpc(err) => err.indicates_invalid_account_data(),
            SubmitError::Execution { err, .. } => is_invalid_account_data(err),
            _ => false,
        }
    }
}

/// Close `account` and send its lamports to the operator.
///
/// Returns the confirmed signature. After `policy.max_retries` expired
/// attempts the last expiry error is returned.
pub async fn submit_close(
    rpc: &dyn ChainRpc,
    account: &Pubkey,
    operator: &Keypair,
    token_program: &Pubkey,
    policy: &SubmitPolicy,
) -> Result<Signature, SubmitError> {
    let operator_key = operator.pubkey();
    let instruction = spl_token::instruction::close_account(
        token_program,
        account,
        &operator_key,
        &operator_key,
        &[],
    )
    .map_err(|e| SubmitError::Build(e.to_string()))?;

    let attempts = policy.max_retries.max(1);
    let mut last_error = SubmitError::BlockhashExpired { attempts: 0 };

    for attempt in 1..=attempts {
        let (blockhash, last_valid_block_height) = rpc.get_latest_blockhash().await?;

        let transaction = Transaction::new_signed_with_payer(
            &[instruction.clone()],
            Some(&operator_key),
            &[operator],
            blockhash,
        );

        logger::debug(
            LogTag::Submitter,
            &format!(
                "Close {} attempt {}/{} (valid until height {})",
                account, attempt, attempts, last_valid_block_height
            ),
        );

        match rpc.send_transaction(&transaction).await {
            Ok(signature) => {
                match rpc
                    .confirm_transaction(&signature, &blockhash, last_valid_block_height)
                    .await?
                {
                    ConfirmationOutcome::Confirmed => {
                        logger::debug(
                            LogTag::Submitter,
                            &format!("Close {} confirmed: {}", account, signature),
                        );
                        return Ok(signature);
                    }
                    ConfirmationOutcome::Failed(err) => {
                        return Err(SubmitError::Execution {
                            signature: signature.to_string(),
                            err,
                        });
                    }
                    ConfirmationOutcome::Expired => {
                        last_error = SubmitError::BlockhashExpired { attempts: attempt };
                    }
                }
            }
            Err(err) if err.is_blockhash_not_found() => {
                last_error = SubmitError::Rpc(err);
            }
            Err(err) => return Err(err.into()),
        }

        logger::warning(
            LogTag::Submitter,
            &format!(
                "Blockhash expired closing {} (attempt {}/{}): {}",
                account, attempt, attempts, last_error
            ),
        );

        if attempt < attempts {
            tokio::time::sleep(policy.backoff).await;
        }
    }

    Err(last_error)
}
