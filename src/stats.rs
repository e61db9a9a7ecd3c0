/// Tracked-account statistics
///
/// Aggregate counts per status and the lamports recovered so far, rendered
/// by `--stats`.
use serde::Serialize;
use std::fmt;

use crate::constants::lamports_to_sol;
use crate::database::{AccountStatus, AccountStore, StoreResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub total: u64,
    pub monitoring: u64,
    pub probation: u64,
    pub reclaimed: u64,
    pub marked_for_death: u64,
    pub errors: u64,
    /// Sum of `balance_lamports` over RECLAIMED rows
    pub recovered_lamports: u64,
}

pub fn collect(store: &dyn AccountStore) -> StoreResult<StatsReport> {
    let mut report = StatsReport::default();

    for (status, count) in store.status_breakdown()? {
        report.total += count;
        match status {
            AccountStatus::Monitoring => report.monitoring = count,
            AccountStatus::Probation => report.probation = count,
            AccountStatus::Reclaimed => report.reclaimed = count,
            AccountStatus::MarkedForDeath => report.marked_for_death = count,
            AccountStatus::Error => report.errors = count,
        }
    }

    report.recovered_lamports = store.sum_balance_by_status(AccountStatus::Reclaimed)?;
    Ok(report)
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Rent Reclaimer Statistics")?;
        writeln!(f, "Total Accounts Tracked: {}", self.total)?;
        writeln!(f)?;
        writeln!(f, "✅ Reclaimed:        {}", self.reclaimed)?;
        writeln!(f, "⏳ Probation:        {}", self.probation)?;
        writeln!(f, "🔍 Monitoring:       {}", self.monitoring)?;
        writeln!(f, "🚩 Marked for death: {}", self.marked_for_death)?;
        writeln!(f, "❌ Errors:           {}", self.errors)?;
        writeln!(f)?;
        write!(
            f,
            "💰 Total Recovered: {:.4} SOL",
            lamports_to_sol(self.recovered_lamports)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{NewAccount, SqliteAccountStore, StatusUpdate};

    #[test]
    fn collects_counts_and_recovered_sol() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        for (i, address) in ["A", "B", "C", "D"].iter().enumerate() {
            store
                .insert_if_absent(&NewAccount {
                    address: address.to_string(),
                    owner_program: "SystemProgram".to_string(),
                    balance_lamports: 1_000_000_000,
                    last_active_at: 0,
                    created_at: i as i64,
                })
                .unwrap();
        }
        store
            .update_status("A", &StatusUpdate::new(AccountStatus::Reclaimed).reclaimed_at(1))
            .unwrap();
        store
            .update_status("B", &StatusUpdate::new(AccountStatus::Probation).checked_at(1))
            .unwrap();
        store
            .update_status("C", &StatusUpdate::new(AccountStatus::Error).error("boom"))
            .unwrap();

        let report = collect(&store).unwrap();
        assert_eq!(
            report,
            StatsReport {
                total: 4,
                monitoring: 1,
                probation: 1,
                reclaimed: 1,
                marked_for_death: 0,
                errors: 1,
                recovered_lamports: 1_000_000_000,
            }
        );
        assert!(report.to_string().contains("Total Recovered: 1.0000 SOL"));
    }
}
