//! `solana-client` backed implementation of the chain collaborators

use async_trait::async_trait;
use futures::future::join_all;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig};
use solana_client::rpc_request::{RpcError as ClientRpcError, RpcResponseErrorData};
use solana_sdk::{
    account::Account,
    commitment_config::{CommitmentConfig, CommitmentLevel},
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
    UiParsedInstruction, UiTransactionEncoding,
};
use std::str::FromStr;
use std::time::Duration;

use super::{ChainRpc, ConfirmationOutcome, RpcError};
use crate::config::{ReclaimConfig, RpcConfig};
use crate::logger::{self, LogTag};
use crate::sync::{HistoricalTransaction, HistorySource, ParsedCall};

/// Solana JSON-RPC client working at the "confirmed" commitment level
pub struct SolanaRpc {
    client: RpcClient,
    commitment: CommitmentConfig,
    poll_interval: Duration,
}

impl SolanaRpc {
    pub fn new(url: &str, timeout: Duration, poll_interval: Duration) -> Self {
        let commitment = CommitmentConfig::confirmed();
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                url.to_string(),
                timeout,
                commitment,
            ),
            commitment,
            poll_interval,
        }
    }

    pub fn from_config(rpc: &RpcConfig, reclaim: &ReclaimConfig) -> Self {
        Self::new(
            &rpc.url,
            Duration::from_secs(rpc.timeout_secs),
            Duration::from_millis(reclaim.confirm_poll_interval_ms),
        )
    }

    /// Status of one signature, `None` while the node has not seen it
    async fn signature_outcome(
        &self,
        signature: &Signature,
    ) -> Result<Option<ConfirmationOutcome>, RpcError> {
        let statuses = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| map_client_error("getSignatureStatuses", e))?
            .value;

        let Some(Some(status)) = statuses.into_iter().next() else {
            return Ok(None);
        };

        if let Some(err) = status.err.clone() {
            let err: TransactionError = err.into();
            return Ok(Some(ConfirmationOutcome::Failed(err)));
        }

        if status.satisfies_commitment(self.commitment) {
            return Ok(Some(ConfirmationOutcome::Confirmed));
        }

        Ok(None)
    }
}

/// Translate a client error, keeping the typed transaction error and the
/// simulation logs when the node rejected a transaction.
fn map_client_error(method: &str, err: ClientError) -> RpcError {
    let transaction_error = err.get_transaction_error();

    if let ClientErrorKind::RpcError(ClientRpcError::RpcResponseError { message, data, .. }) =
        err.kind()
    {
        if let RpcResponseErrorData::SendTransactionPreflightFailure(simulation) = data {
            return RpcError::SendRejected {
                message: message.clone(),
                err: transaction_error,
                logs: simulation.logs.clone().unwrap_or_default(),
            };
        }
    }

    if let Some(tx_err) = transaction_error {
        return RpcError::SendRejected {
            message: err.to_string(),
            err: Some(tx_err),
            logs: Vec::new(),
        };
    }

    RpcError::request(method, err.to_string())
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>, RpcError> {
        logger::debug(LogTag::Rpc, &format!("getAccountInfo {}", address));
        self.client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(|e| map_client_error("getAccountInfo", e))
    }

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), RpcError> {
        self.client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(|e| map_client_error("getLatestBlockhash", e))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(CommitmentLevel::Confirmed),
            max_retries: Some(2),
            ..Default::default()
        };

        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| map_client_error("sendTransaction", e))
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &Hash,
        last_valid_block_height: u64,
    ) -> Result<ConfirmationOutcome, RpcError> {
        logger::debug(
            LogTag::Rpc,
            &format!(
                "Confirming {} (blockhash {}, valid until height {})",
                signature, blockhash, last_valid_block_height
            ),
        );

        let mut height_exceeded = false;
        loop {
            if let Some(outcome) = self.signature_outcome(signature).await? {
                return Ok(outcome);
            }

            // One last status read after the window closed, then give up.
            if height_exceeded {
                return Ok(ConfirmationOutcome::Expired);
            }

            let block_height = self
                .client
                .get_block_height_with_commitment(self.commitment)
                .await
                .map_err(|e| map_client_error("getBlockHeight", e))?;

            if block_height > last_valid_block_height {
                height_exceeded = true;
                continue;
            }

            logger::verbose(
                LogTag::Rpc,
                &format!(
                    "{} pending at height {} (valid until {})",
                    signature, block_height, last_valid_block_height
                ),
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl HistorySource for SolanaRpc {
    async fn recent_transactions(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<HistoricalTransaction>, RpcError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(limit),
            commitment: Some(self.commitment),
            ..Default::default()
        };

        let signatures = self
            .client
            .get_signatures_for_address_with_config(address, config)
            .await
            .map_err(|e| map_client_error("getSignaturesForAddress", e))?;

        let lookups = signatures.into_iter().map(|entry| async move {
            let signature = Signature::from_str(&entry.signature).ok()?;
            let tx_config = RpcTransactionConfig {
                encoding: Some(UiTransactionEncoding::JsonParsed),
                commitment: Some(self.commitment),
                max_supported_transaction_version: Some(0),
            };
            match self.client.get_transaction_with_config(&signature, tx_config).await {
                Ok(tx) => to_historical(entry.signature, tx),
                Err(e) => {
                    logger::debug(
                        LogTag::Rpc,
                        &format!("getTransaction {} failed: {}", entry.signature, e),
                    );
                    None
                }
            }
        });

        Ok(join_all(lookups).await.into_iter().flatten().collect())
    }
}

/// Reduce a jsonParsed transaction to the fields the sync job filters on.
/// Transactions without status meta or a parsed message are dropped.
fn to_historical(
    signature: String,
    tx: EncodedConfirmedTransactionWithStatusMeta,
) -> Option<HistoricalTransaction> {
    tx.transaction.meta.as_ref()?;

    let EncodedTransaction::Json(ui_transaction) = tx.transaction.transaction else {
        return None;
    };
    let UiMessage::Parsed(message) = ui_transaction.message else {
        return None;
    };

    let fee_payer = message.account_keys.first().map(|key| key.pubkey.clone());
    let instructions = message
        .instructions
        .into_iter()
        .filter_map(|instruction| match instruction {
            UiInstruction::Parsed(UiParsedInstruction::Parsed(parsed)) => Some(ParsedCall {
                program: parsed.program,
                parsed: parsed.parsed,
            }),
            _ => None,
        })
        .collect();

    Some(HistoricalTransaction {
        signature,
        fee_payer,
        block_time: tx.block_time,
        instructions,
    })
}
