//! Candidate selection for one cycle

use crate::database::{AccountStatus, AccountStore, CandidateQuery, StoreResult, TrackedAccount};

pub fn candidate_query(now_ms: i64, probation_period_ms: i64, batch_size: usize) -> CandidateQuery {
    CandidateQuery {
        probation_cutoff_ms: now_ms.saturating_sub(probation_period_ms),
        limit: batch_size,
    }
}

/// Whether an account is due for inspection under `query`
pub fn is_due(account: &TrackedAccount, query: &CandidateQuery) -> bool {
    match account.status {
        AccountStatus::Monitoring => true,
        AccountStatus::Probation => {
            account.last_checked.unwrap_or(0) < query.probation_cutoff_ms
        }
        _ => false,
    }
}

/// Pull the accounts due this cycle, at most `batch_size`.
///
/// Due PROBATION rows come first, then MONITORING rows oldest first, so
/// MONITORING rows left untouched by a cycle cannot crowd them out.
///
/// The predicate is re-applied to whatever the store returns so a RECLAIMED
/// row can never reach the state machine.
pub fn select(
    store: &dyn AccountStore,
    now_ms: i64,
    probation_period_ms: i64,
    batch_size: usize,
) -> StoreResult<Vec<TrackedAccount>> {
    let query = candidate_query(now_ms, probation_period_ms, batch_size);
    let mut candidates: Vec<TrackedAccount> = store
        .select_candidates(&query)?
        .into_iter()
        .filter(|account| is_due(account, &query))
        .collect();
    candidates.truncate(batch_size);
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DAY_MS, PROBATION_PERIOD_MS};

    fn account(status: AccountStatus, last_checked: Option<i64>) -> TrackedAccount {
        TrackedAccount {
            address: "A".to_string(),
            owner_program: None,
            status,
            balance_lamports: 0,
            last_active_at: None,
            last_checked,
            created_at: 0,
            reclaimed_at: None,
            reclaim_tx_signature: None,
            error_log: None,
            retry_count: 0,
            tx_count: 0,
        }
    }

    #[test]
    fn predicate_matches_cooldown_rules() {
        let now = 200 * DAY_MS;
        let query = candidate_query(now, PROBATION_PERIOD_MS, 5);

        assert!(is_due(&account(AccountStatus::Monitoring, None), &query));
        let probation = |checked: i64| account(AccountStatus::Probation, Some(checked));

        assert!(is_due(&probation(now - 61 * DAY_MS), &query));
        assert!(!is_due(&probation(now - 59 * DAY_MS), &query));
        assert!(!is_due(&probation(now - PROBATION_PERIOD_MS), &query));
        assert!(!is_due(&account(AccountStatus::MarkedForDeath, None), &query));
        assert!(!is_due(&account(AccountStatus::Error, None), &query));
    }

    #[test]
    fn reclaimed_is_never_due() {
        let query = CandidateQuery {
            probation_cutoff_ms: i64::MAX,
            limit: usize::MAX,
        };
        for last_checked in [None, Some(0), Some(i64::MIN), Some(i64::MAX - 1)] {
            assert!(!is_due(&account(AccountStatus::Reclaimed, last_checked), &query));
        }
    }

    #[test]
    fn cutoff_saturates() {
        let query = candidate_query(i64::MIN + 1, PROBATION_PERIOD_MS, 5);
        assert_eq!(query.probation_cutoff_ms, i64::MIN);
    }
}
