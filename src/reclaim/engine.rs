//! Reclaim state machine and cycle runner
//!
//! One cycle: select due accounts, then for each one (strictly in order)
//! read it from chain, classify it, decide the transition, optionally submit
//! a close, and write the new status back. Per-account failures are
//! recorded on the row and never abort the cycle; only a failed candidate
//! fetch is returned to the caller.

use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

use super::classifier::{classify, AccountKind, ProgramIds};
use super::selector;
use super::submitter::{submit_close, SubmitPolicy};
use super::summary::{AccountOutcome, AccountReport, CycleSummary, OutcomeCategory};
use crate::config::ReclaimConfig;
use crate::constants::{
    BATCH_SIZE, DAY_MS, DEFAULT_MAX_RETRIES, PROBATION_PERIOD_MS, RETRY_BACKOFF_MS,
    TOKEN_ACCOUNT_MIN_LEN,
};
use crate::database::{AccountStatus, AccountStore, EventLevel, StatusUpdate, TrackedAccount};
use crate::errors::{DataError, ReclaimError};
use crate::logger::{self, LogTag};
use crate::notifications::Notifier;
use crate::rpc::ChainRpc;

/// Engine inputs derived from validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReclaimSettings {
    pub dry_run: bool,
    pub max_retries: u32,
    pub batch_size: usize,
    pub probation_period_ms: i64,
    pub retry_backoff: Duration,
    pub programs: ProgramIds,
}

impl Default for ReclaimSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_retries: DEFAULT_MAX_RETRIES,
            batch_size: BATCH_SIZE,
            probation_period_ms: PROBATION_PERIOD_MS,
            retry_backoff: Duration::from_millis(RETRY_BACKOFF_MS),
            programs: ProgramIds::default(),
        }
    }
}

impl ReclaimSettings {
    pub fn from_config(config: &ReclaimConfig) -> Self {
        Self {
            dry_run: config.dry_run,
            max_retries: config.max_retries,
            batch_size: config.batch_size,
            probation_period_ms: i64::from(config.probation_period_days) * DAY_MS,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            programs: ProgramIds::default(),
        }
    }

    fn submit_policy(&self) -> SubmitPolicy {
        SubmitPolicy {
            max_retries: self.max_retries,
            backoff: self.retry_backoff,
        }
    }
}

/// Transition chosen for one classified account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Absent on chain, record as reclaimed without a signature
    ObservedClosed,
    MarkForDeath { lamports: u64 },
    Probation { token_balance: u64, lamports: u64 },
    NotOperatorOwned { owner: Pubkey },
    DryRunSkip,
    SubmitClose { lamports: u64 },
    Skip { kind: String },
}

/// Pure transition table. Fails only when a token record is too short to
/// expose its balance and owner.
pub fn decide(
    address: &str,
    kind: &AccountKind,
    operator: &Pubkey,
    dry_run: bool,
) -> Result<Decision, DataError> {
    match kind {
        AccountKind::Closed => Ok(Decision::ObservedClosed),
        AccountKind::SystemWallet { lamports } => Ok(Decision::MarkForDeath {
            lamports: *lamports,
        }),
        AccountKind::TokenAccount(info) => {
            let (Some(token_balance), Some(owner)) = (info.balance(), info.owner()) else {
                return Err(DataError::TruncatedAccountData {
                    address: address.to_string(),
                    len: info.data_len(),
                    required: TOKEN_ACCOUNT_MIN_LEN,
                });
            };

            if token_balance > 0 {
                return Ok(Decision::Probation {
                    token_balance,
                    lamports: info.lamports,
                });
            }
            if owner != *operator {
                return Ok(Decision::NotOperatorOwned { owner });
            }
            if dry_run {
                return Ok(Decision::DryRunSkip);
            }
            Ok(Decision::SubmitClose {
                lamports: info.lamports,
            })
        }
        AccountKind::Other { owner, .. } => Ok(Decision::Skip {
            kind: format!("{} {}", kind.label(), owner),
        }),
    }
}

pub struct ReclaimEngine {
    store: Arc<dyn AccountStore>,
    rpc: Arc<dyn ChainRpc>,
    notifier: Arc<dyn Notifier>,
    settings: ReclaimSettings,
    /// Held for the whole cycle so overlapping callers run one after another
    cycle_lock: AsyncMutex<()>,
}

impl ReclaimEngine {
    pub fn new(
        store: Arc<dyn AccountStore>,
        rpc: Arc<dyn ChainRpc>,
        notifier: Arc<dyn Notifier>,
        settings: ReclaimSettings,
    ) -> Self {
        Self {
            store,
            rpc,
            notifier,
            settings,
            cycle_lock: AsyncMutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    pub async fn run_cycle(&self, operator: &Keypair) -> Result<CycleSummary, ReclaimError> {
        self.run_cycle_at(operator, chrono::Utc::now().timestamp_millis())
            .await
    }

    /// Run one cycle with an explicit clock reading for the probation cutoff
    /// and written timestamps
    pub async fn run_cycle_at(
        &self,
        operator: &Keypair,
        now_ms: i64,
    ) -> Result<CycleSummary, ReclaimError> {
        let _guard = self.cycle_lock.lock().await;

        let mut summary = CycleSummary::new(now_ms, self.settings.dry_run);
        logger::info(
            LogTag::Reclaim,
            &format!("Reclaim cycle started (mode {})", summary.mode_label()),
        );
        self.record_event(EventLevel::Info, "Reclaim cycle started", None);

        let candidates = selector::select(
            self.store.as_ref(),
            now_ms,
            self.settings.probation_period_ms,
            self.settings.batch_size,
        )
        .map_err(|e| {
            logger::error(LogTag::Selector, &format!("Candidate fetch failed: {}", e));
            e
        })?;

        logger::debug(
            LogTag::Selector,
            &format!("{} candidate(s) due", candidates.len()),
        );

        for account in &candidates {
            let outcome = self.process_account(account, operator, now_ms).await;
            let report = summary.record(account.address.clone(), outcome);
            self.log_outcome(report);
        }

        summary.finished_at_ms = chrono::Utc::now().timestamp_millis().max(now_ms);

        logger::info(
            LogTag::Reclaim,
            &format!("Reclaim cycle finished: {}", summary.headline()),
        );
        self.record_event(
            EventLevel::Info,
            "Reclaim cycle finished",
            Some(json!({
                "processed": summary.processed(),
                "reclaimed": summary.reclaimed(),
                "probation": summary.probation(),
                "errors": summary.errors(),
                "recovered_lamports": summary.recovered_lamports(),
                "dry_run": summary.dry_run,
            })),
        );

        if summary.processed() > 0 {
            if let Err(e) = self.notifier.notify(&summary.notification_text()).await {
                logger::warning(
                    LogTag::Notify,
                    &format!("Cycle summary notification failed: {}", e),
                );
            }
        }

        Ok(summary)
    }

    /// Never fails: errors move the row to ERROR and become an outcome
    async fn process_account(
        &self,
        account: &TrackedAccount,
        operator: &Keypair,
        now_ms: i64,
    ) -> AccountOutcome {
        match self.inspect(account, operator, now_ms).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let reason = err.to_string();
                let update = StatusUpdate::new(AccountStatus::Error)
                    .checked_at(now_ms)
                    .error(reason.clone());
                if let Err(store_err) = self.store.update_status(&account.address, &update) {
                    logger::error(
                        LogTag::Database,
                        &format!(
                            "Failed to record ERROR for {}: {}",
                            account.address, store_err
                        ),
                    );
                }
                AccountOutcome::Errored { reason }
            }
        }
    }

    async fn inspect(
        &self,
        account: &TrackedAccount,
        operator: &Keypair,
        now_ms: i64,
    ) -> Result<AccountOutcome, ReclaimError> {
        let address = Pubkey::from_str(&account.address).map_err(|e| DataError::InvalidAddress {
            address: account.address.clone(),
            error: e.to_string(),
        })?;

        let info = self.rpc.get_account_info(&address).await?;
        let kind = classify(info.as_ref(), &self.settings.programs);

        logger::debug(
            LogTag::Classifier,
            &format!("{} ({}) classified as {}", account.address, account.status, kind.label()),
        );

        let decision = decide(&account.address, &kind, &operator.pubkey(), self.settings.dry_run)?;

        let outcome = match decision {
            Decision::ObservedClosed => {
                self.write(
                    account,
                    StatusUpdate::new(AccountStatus::Reclaimed).reclaimed_at(now_ms),
                )?;
                AccountOutcome::AlreadyClosed
            }
            Decision::MarkForDeath { lamports } => {
                self.write(
                    account,
                    StatusUpdate::new(AccountStatus::MarkedForDeath)
                        .checked_at(now_ms)
                        .balance(lamports),
                )?;
                AccountOutcome::MarkedForDeath
            }
            Decision::Probation {
                token_balance,
                lamports,
            } => {
                self.write(
                    account,
                    StatusUpdate::new(AccountStatus::Probation)
                        .checked_at(now_ms)
                        .balance(lamports),
                )?;
                AccountOutcome::Probation { token_balance }
            }
            Decision::NotOperatorOwned { owner } => AccountOutcome::NotOperatorOwned {
                owner: owner.to_string(),
            },
            Decision::DryRunSkip => AccountOutcome::DryRunSkipped,
            Decision::Skip { kind } => AccountOutcome::Skipped { kind },
            Decision::SubmitClose { lamports } => {
                self.close(account, &address, lamports, operator, now_ms)
                    .await?
            }
        };

        Ok(outcome)
    }

    /// Submit the close and commit its result. A submission failure leaves
    /// the row untouched unless the account turns out to be gone already.
    async fn close(
        &self,
        account: &TrackedAccount,
        address: &Pubkey,
        lamports: u64,
        operator: &Keypair,
        now_ms: i64,
    ) -> Result<AccountOutcome, ReclaimError> {
        let policy = self.settings.submit_policy();
        let result = submit_close(
            self.rpc.as_ref(),
            address,
            operator,
            &self.settings.programs.token_program,
            &policy,
        )
        .await;

        let err = match result {
            Ok(signature) => {
                let signature = signature.to_string();
                let update = StatusUpdate::new(AccountStatus::Reclaimed)
                    .reclaimed_at(now_ms)
                    .balance(lamports)
                    .signature(signature.clone());
                // Confirmed on chain, so the outcome stands even if the write fails
                if let Err(e) = self.write(account, update) {
                    let message = format!(
                        "{} closed in {} but the row was not updated: {}",
                        account.address, signature, e
                    );
                    logger::error(LogTag::Database, &message);
                    self.record_event(
                        EventLevel::Error,
                        &message,
                        Some(json!({
                            "address": account.address,
                            "signature": signature,
                            "lamports": lamports,
                        })),
                    );
                }
                return Ok(AccountOutcome::Reclaimed {
                    signature: Some(signature),
                    lamports,
                });
            }
            Err(err) => err,
        };

        if err.is_invalid_account_data() {
            match self.rpc.get_account_info(address).await {
                Ok(None) => {
                    logger::info(
                        LogTag::Submitter,
                        &format!(
                            "{} was closed concurrently, recording as reclaimed",
                            account.address
                        ),
                    );
                    self.write(
                        account,
                        StatusUpdate::new(AccountStatus::Reclaimed)
                            .reclaimed_at(now_ms)
                            .balance(lamports),
                    )?;
                    return Ok(AccountOutcome::Reclaimed {
                        signature: None,
                        lamports,
                    });
                }
                Ok(Some(_)) => logger::warning(
                    LogTag::Submitter,
                    &format!(
                        "{} rejected as invalid account data but still exists",
                        account.address
                    ),
                ),
                Err(recheck) => logger::warning(
                    LogTag::Submitter,
                    &format!("Re-check of {} failed: {}", account.address, recheck),
                ),
            }
        }

        Ok(AccountOutcome::SubmitFailed {
            reason: err.to_string(),
        })
    }

    fn write(&self, account: &TrackedAccount, update: StatusUpdate) -> Result<(), ReclaimError> {
        let changed = self.store.update_status(&account.address, &update)?;
        if !changed {
            logger::warning(
                LogTag::Database,
                &format!(
                    "Status write to {} for {} changed no row",
                    update.status, account.address
                ),
            );
        }
        Ok(())
    }

    fn log_outcome(&self, report: &AccountReport) {
        let line = report.line();
        let level = match report.outcome.category() {
            OutcomeCategory::Reclaimed => {
                logger::info(LogTag::Reclaim, &line);
                EventLevel::Success
            }
            OutcomeCategory::Error => {
                logger::error(LogTag::Reclaim, &line);
                EventLevel::Error
            }
            OutcomeCategory::Probation | OutcomeCategory::Flagged | OutcomeCategory::Skipped => {
                logger::info(LogTag::Reclaim, &line);
                EventLevel::Info
            }
        };
        self.record_event(level, &line, serde_json::to_value(report).ok());
    }

    /// Durable log sink; a failed write is reported and ignored
    fn record_event(&self, level: EventLevel, message: &str, meta: Option<serde_json::Value>) {
        if let Err(e) = self.store.append_event(level, message, meta.as_ref()) {
            logger::warning(
                LogTag::Database,
                &format!("Failed to append event '{}': {}", message, e),
            );
        }
    }
}
