//! Discovery job
//!
//! Scans the operator's recent transaction history for system
//! `createAccount` instructions it paid for and starts tracking each new
//! account as MONITORING.

use async_trait::async_trait;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;

use crate::database::{AccountStore, NewAccount};
use crate::errors::ReclaimError;
use crate::logger::{self, LogTag};
use crate::rpc::RpcError;

/// Owner label stored for rows found by this job
pub const SYSTEM_PROGRAM_LABEL: &str = "SystemProgram";

/// One parsed instruction (`program` is the parser name, e.g. "system")
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCall {
    pub program: String,
    pub parsed: Value,
}

/// The fields of a jsonParsed transaction the job needs
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalTransaction {
    pub signature: String,
    /// First account key of the message
    pub fee_payer: Option<String>,
    /// Seconds since epoch
    pub block_time: Option<i64>,
    pub instructions: Vec<ParsedCall>,
}

/// Source of an address's recent parsed transactions, newest first.
/// Lookups that fail individually are left out.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn recent_transactions(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<HistoricalTransaction>, RpcError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Transactions inspected
    pub scanned: usize,
    /// Rows newly inserted
    pub added: usize,
}

/// `(new account, lamports)` of a parsed system `createAccount` call
fn created_account(call: &ParsedCall) -> Option<(String, u64)> {
    if call.program != "system" || call.parsed.get("type")?.as_str()? != "createAccount" {
        return None;
    }
    let info = call.parsed.get("info")?;
    let address = info.get("newAccount")?.as_str()?.to_string();
    let lamports = info.get("lamports").and_then(Value::as_u64).unwrap_or(0);
    Some((address, lamports))
}

pub async fn sync_recent_accounts(
    history: &dyn HistorySource,
    store: &dyn AccountStore,
    operator: &Pubkey,
    history_limit: usize,
    now_ms: i64,
) -> Result<SyncReport, ReclaimError> {
    let operator_text = operator.to_string();
    let transactions = history.recent_transactions(operator, history_limit).await?;

    let mut report = SyncReport {
        scanned: transactions.len(),
        added: 0,
    };

    for tx in &transactions {
        if tx.fee_payer.as_deref() != Some(operator_text.as_str()) {
            continue;
        }

        for call in &tx.instructions {
            let Some((address, lamports)) = created_account(call) else {
                continue;
            };

            let inserted = store.insert_if_absent(&NewAccount {
                address: address.clone(),
                owner_program: SYSTEM_PROGRAM_LABEL.to_string(),
                balance_lamports: lamports,
                last_active_at: tx.block_time.map(|t| t * 1000).unwrap_or(now_ms),
                created_at: now_ms,
            })?;

            if inserted {
                report.added += 1;
                logger::info(
                    LogTag::Sync,
                    &format!("Tracking new account {} (tx {})", address, tx.signature),
                );
            } else {
                logger::debug(LogTag::Sync, &format!("{} already tracked", address));
            }
        }
    }

    logger::info(
        LogTag::Sync,
        &format!(
            "Sync scanned {} transaction(s), added {} account(s)",
            report.scanned, report.added
        ),
    );
    Ok(report)
}
