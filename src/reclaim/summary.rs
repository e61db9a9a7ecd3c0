//! Per-cycle outcome tally
//!
//! Every count is derived from the outcome list, so
//! `reclaimed + probation + errors + flagged + skipped == processed`.

use serde::Serialize;

use crate::constants::lamports_to_sol;

/// What happened to one account this cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AccountOutcome {
    /// Close confirmed, or an already-closed race detected after submission
    Reclaimed {
        signature: Option<String>,
        lamports: u64,
    },
    /// Account no longer exists on chain; nothing credited
    AlreadyClosed,
    /// Plain system wallet, flagged for manual follow-up
    MarkedForDeath,
    /// Token account still holds tokens
    Probation { token_balance: u64 },
    NotOperatorOwned { owner: String },
    DryRunSkipped,
    /// Owned by a program the engine does not act on
    Skipped { kind: String },
    /// Close transaction failed; row left untouched
    SubmitFailed { reason: String },
    /// Read/classification failure; row moved to ERROR
    Errored { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCategory {
    Reclaimed,
    Probation,
    Flagged,
    Skipped,
    Error,
}

impl AccountOutcome {
    pub fn category(&self) -> OutcomeCategory {
        match self {
            AccountOutcome::Reclaimed { .. } | AccountOutcome::AlreadyClosed => {
                OutcomeCategory::Reclaimed
            }
            AccountOutcome::Probation { .. } => OutcomeCategory::Probation,
            AccountOutcome::MarkedForDeath => OutcomeCategory::Flagged,
            AccountOutcome::NotOperatorOwned { .. }
            | AccountOutcome::DryRunSkipped
            | AccountOutcome::Skipped { .. } => OutcomeCategory::Skipped,
            AccountOutcome::SubmitFailed { .. } | AccountOutcome::Errored { .. } => {
                OutcomeCategory::Error
            }
        }
    }

    pub fn recovered_lamports(&self) -> u64 {
        match self {
            AccountOutcome::Reclaimed { lamports, .. } => *lamports,
            _ => 0,
        }
    }

    /// Transcript line body
    pub fn describe(&self) -> String {
        match self {
            AccountOutcome::Reclaimed {
                signature: Some(signature),
                lamports,
            } => format!("Reclaimed {:.4} SOL ({})", lamports_to_sol(*lamports), signature),
            AccountOutcome::Reclaimed {
                signature: None,
                lamports,
            } => format!(
                "Reclaimed {:.4} SOL (closed concurrently)",
                lamports_to_sol(*lamports)
            ),
            AccountOutcome::AlreadyClosed => "Already Closed".to_string(),
            AccountOutcome::MarkedForDeath => "System Wallet flagged".to_string(),
            AccountOutcome::Probation { token_balance } => {
                format!("Probation (Funded, {} tokens)", token_balance)
            }
            AccountOutcome::NotOperatorOwned { owner } => {
                format!("Not operator-owned (owner {})", owner)
            }
            AccountOutcome::DryRunSkipped => "Dry Run (Skipped)".to_string(),
            AccountOutcome::Skipped { kind } => format!("Skipped ({})", kind),
            AccountOutcome::SubmitFailed { reason } => format!("Close failed: {}", reason),
            AccountOutcome::Errored { reason } => format!("Error: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReport {
    pub address: String,
    pub outcome: AccountOutcome,
}

impl AccountReport {
    pub fn line(&self) -> String {
        format!("{}: {}", self.address, self.outcome.describe())
    }
}

/// Result of one reclaim cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub started_at_ms: i64,
    pub finished_at_ms: i64,
    pub dry_run: bool,
    pub reports: Vec<AccountReport>,
}

impl CycleSummary {
    pub fn new(started_at_ms: i64, dry_run: bool) -> Self {
        Self {
            started_at_ms,
            finished_at_ms: started_at_ms,
            dry_run,
            reports: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        address: impl Into<String>,
        outcome: AccountOutcome,
    ) -> &AccountReport {
        let index = self.reports.len();
        self.reports.push(AccountReport {
            address: address.into(),
            outcome,
        });
        &self.reports[index]
    }

    pub fn processed(&self) -> usize {
        self.reports.len()
    }

    fn count(&self, category: OutcomeCategory) -> usize {
        self.reports
            .iter()
            .filter(|report| report.outcome.category() == category)
            .count()
    }

    pub fn reclaimed(&self) -> usize {
        self.count(OutcomeCategory::Reclaimed)
    }

    pub fn probation(&self) -> usize {
        self.count(OutcomeCategory::Probation)
    }

    pub fn errors(&self) -> usize {
        self.count(OutcomeCategory::Error)
    }

    pub fn flagged(&self) -> usize {
        self.count(OutcomeCategory::Flagged)
    }

    pub fn skipped(&self) -> usize {
        self.count(OutcomeCategory::Skipped)
    }

    pub fn recovered_lamports(&self) -> u64 {
        self.reports
            .iter()
            .map(|report| report.outcome.recovered_lamports())
            .sum()
    }

    pub fn transcript(&self) -> Vec<String> {
        self.reports.iter().map(AccountReport::line).collect()
    }

    pub fn mode_label(&self) -> &'static str {
        if self.dry_run {
            "DRY RUN"
        } else {
            "LIVE"
        }
    }

    /// Notifier message (Telegram HTML subset)
    pub fn notification_text(&self) -> String {
        format!(
            "🧹 <b>Rent Reclaim Summary</b>\n\
             Processed: {}\n\
             Reclaimed: {}\n\
             Probation: {}\n\
             Errors: {}\n\
             Recovered: {:.4} SOL\n\
             Mode: {}",
            self.processed(),
            self.reclaimed(),
            self.probation(),
            self.errors(),
            lamports_to_sol(self.recovered_lamports()),
            self.mode_label()
        )
    }

    /// One-line form for the console and event log
    pub fn headline(&self) -> String {
        format!(
            "processed={} reclaimed={} probation={} flagged={} skipped={} errors={} recovered={:.4} SOL mode={}",
            self.processed(),
            self.reclaimed(),
            self.probation(),
            self.flagged(),
            self.skipped(),
            self.errors(),
            lamports_to_sol(self.recovered_lamports()),
            self.mode_label()
        )
    }
}
