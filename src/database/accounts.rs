use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::connection::SqliteAccountStore;
use super::models::{
    AccountStatus, CandidateQuery, EventLevel, EventRecord, NewAccount, StatusUpdate,
    TrackedAccount,
};
use super::{AccountStore, StoreResult};

const ACCOUNT_COLUMNS: &str = "address, owner_program, balance_lamports, last_active_at, \
     last_checked, created_at, reclaimed_at, reclaim_tx_signature, error_log, status, \
     retry_count, tx_count";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<TrackedAccount> {
    let status_text: String = row.get(9)?;
    let status = status_text.parse::<AccountStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, Type::Text, e.into())
    })?;

    Ok(TrackedAccount {
        address: row.get(0)?,
        owner_program: row.get(1)?,
        balance_lamports: row.get(2)?,
        last_active_at: row.get(3)?,
        last_checked: row.get(4)?,
        created_at: row.get(5)?,
        reclaimed_at: row.get(6)?,
        reclaim_tx_signature: row.get(7)?,
        error_log: row.get(8)?,
        status,
        retry_count: row.get(10)?,
        tx_count: row.get(11)?,
    })
}

impl AccountStore for SqliteAccountStore {
    fn select_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<TrackedAccount>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts
             WHERE status = 'MONITORING'
                OR (status = 'PROBATION' AND COALESCE(last_checked, 0) < ?1)
             ORDER BY CASE status WHEN 'PROBATION' THEN 0 ELSE 1 END,
                      created_at ASC, address ASC
             LIMIT ?2",
            ACCOUNT_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![query.probation_cutoff_ms, query.limit as i64],
            account_from_row,
        )?;

        let mut accounts = Vec::new();
        for account in rows {
            accounts.push(account?);
        }
        Ok(accounts)
    }

    fn update_status(&self, address: &str, update: &StatusUpdate) -> StoreResult<bool> {
        let conn = self.conn.lock();

        // RECLAIMED rows are frozen; timestamps never move backwards and the
        // signature is written at most once.
        let changed = conn.execute(
            "UPDATE accounts SET
                status = ?2,
                balance_lamports = COALESCE(?3, balance_lamports),
                last_checked = CASE WHEN ?4 IS NULL THEN last_checked
                                    ELSE MAX(COALESCE(last_checked, 0), ?4) END,
                reclaimed_at = CASE WHEN ?5 IS NULL THEN reclaimed_at
                                    ELSE MAX(COALESCE(reclaimed_at, 0), ?5) END,
                reclaim_tx_signature = COALESCE(reclaim_tx_signature, ?6),
                error_log = COALESCE(?7, error_log)
             WHERE address = ?1 AND status != 'RECLAIMED'",
            params![
                address,
                update.status.as_str(),
                update.balance_lamports,
                update.last_checked,
                update.reclaimed_at,
                update.reclaim_tx_signature,
                update.error_log,
            ],
        )?;

        Ok(changed > 0)
    }

    fn count_by_status(&self, status: AccountStatus) -> StoreResult<u64> {
        let conn = self.conn.lock();
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn status_breakdown(&self) -> StoreResult<Vec<(AccountStatus, u64)>> {
        let mut breakdown = Vec::with_capacity(AccountStatus::ALL.len());
        for status in AccountStatus::ALL {
            breakdown.push((status, self.count_by_status(status)?));
        }
        Ok(breakdown)
    }

    fn sum_balance_by_status(&self, status: AccountStatus) -> StoreResult<u64> {
        let conn = self.conn.lock();
        let total: u64 = conn.query_row(
            "SELECT COALESCE(SUM(balance_lamports), 0) FROM accounts WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    fn list_accounts(&self) -> StoreResult<Vec<TrackedAccount>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts ORDER BY created_at DESC, address ASC",
            ACCOUNT_COLUMNS
        ))?;

        let rows = stmt.query_map([], account_from_row)?;
        let mut accounts = Vec::new();
        for account in rows {
            accounts.push(account?);
        }
        Ok(accounts)
    }

    fn get_account(&self, address: &str) -> StoreResult<Option<TrackedAccount>> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(
                &format!("SELECT {} FROM accounts WHERE address = ?1", ACCOUNT_COLUMNS),
                params![address],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    fn insert_if_absent(&self, account: &NewAccount) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO accounts
                (address, owner_program, balance_lamports, last_active_at, created_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, 'MONITORING')",
            params![
                account.address,
                account.owner_program,
                account.balance_lamports,
                account.last_active_at,
                account.created_at,
            ],
        )?;
        Ok(inserted > 0)
    }

    fn append_event(
        &self,
        level: EventLevel,
        message: &str,
        meta: Option<&serde_json::Value>,
    ) -> StoreResult<()> {
        self.insert_event(level, message, meta)
    }

    fn recent_events(&self, limit: usize) -> StoreResult<Vec<EventRecord>> {
        self.load_recent_events(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DAY_MS, PROBATION_PERIOD_MS};

    const NOW: i64 = 1_700_000_000_000;

    fn seed(store: &SqliteAccountStore, address: &str, created_at: i64) {
        store
            .insert_if_absent(&NewAccount {
                address: address.to_string(),
                owner_program: "SystemProgram".to_string(),
                balance_lamports: 2_039_280,
                last_active_at: created_at,
                created_at,
            })
            .unwrap();
    }

    fn query() -> CandidateQuery {
        CandidateQuery {
            probation_cutoff_ms: NOW - PROBATION_PERIOD_MS,
            limit: 5,
        }
    }

    #[test]
    fn insert_if_absent_is_idempotent() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        seed(&store, "A", NOW);
        assert!(!store
            .insert_if_absent(&NewAccount {
                address: "A".to_string(),
                owner_program: "SystemProgram".to_string(),
                balance_lamports: 1,
                last_active_at: NOW,
                created_at: NOW,
            })
            .unwrap());

        let account = store.get_account("A").unwrap().unwrap();
        assert_eq!(account.status, AccountStatus::Monitoring);
        assert_eq!(account.balance_lamports, 2_039_280);
        assert_eq!(account.retry_count, 0);
    }

    #[test]
    fn selector_predicate_and_ordering() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        seed(&store, "b-monitoring", NOW - 3);
        seed(&store, "a-monitoring", NOW - 3);
        seed(&store, "due-probation", NOW - 2);
        seed(&store, "fresh-probation", NOW - 1);
        seed(&store, "reclaimed", NOW - 10);
        seed(&store, "flagged", NOW - 10);

        store
            .update_status(
                "due-probation",
                &StatusUpdate::new(AccountStatus::Probation).checked_at(NOW - 61 * DAY_MS),
            )
            .unwrap();
        store
            .update_status(
                "fresh-probation",
                &StatusUpdate::new(AccountStatus::Probation).checked_at(NOW - DAY_MS),
            )
            .unwrap();
        store
            .update_status(
                "reclaimed",
                &StatusUpdate::new(AccountStatus::Reclaimed).reclaimed_at(NOW),
            )
            .unwrap();
        store
            .update_status(
                "flagged",
                &StatusUpdate::new(AccountStatus::MarkedForDeath).checked_at(NOW),
            )
            .unwrap();

        let selected: Vec<String> = store
            .select_candidates(&query())
            .unwrap()
            .into_iter()
            .map(|a| a.address)
            .collect();
        assert_eq!(selected, vec!["due-probation", "a-monitoring", "b-monitoring"]);
    }

    #[test]
    fn selector_respects_limit() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        for i in 0..8 {
            seed(&store, &format!("acct-{}", i), NOW + i);
        }
        let selected = store.select_candidates(&query()).unwrap();
        assert_eq!(selected.len(), 5);
        assert_eq!(selected[0].address, "acct-0");
    }

    #[test]
    fn reclaimed_rows_are_never_selected() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        for i in 0..10 {
            let address = format!("acct-{}", i);
            seed(&store, &address, NOW - i);
            store
                .update_status(
                    &address,
                    &StatusUpdate::new(AccountStatus::Reclaimed).reclaimed_at(NOW),
                )
                .unwrap();
        }

        let far_future = CandidateQuery {
            probation_cutoff_ms: i64::MAX,
            limit: 100,
        };
        assert!(store.select_candidates(&far_future).unwrap().is_empty());
    }

    #[test]
    fn reclaimed_rows_are_frozen() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        seed(&store, "A", NOW);
        assert!(store
            .update_status(
                "A",
                &StatusUpdate::new(AccountStatus::Reclaimed).reclaimed_at(NOW).signature("sig-1"),
            )
            .unwrap());

        assert!(!store
            .update_status("A", &StatusUpdate::new(AccountStatus::Error).error("late failure"))
            .unwrap());

        let account = store.get_account("A").unwrap().unwrap();
        assert_eq!(account.status, AccountStatus::Reclaimed);
        assert_eq!(account.reclaim_tx_signature.as_deref(), Some("sig-1"));
        assert_eq!(account.error_log, None);
    }

    #[test]
    fn timestamps_never_move_backwards() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        seed(&store, "A", NOW);
        store
            .update_status("A", &StatusUpdate::new(AccountStatus::Probation).checked_at(NOW))
            .unwrap();
        store
            .update_status(
                "A",
                &StatusUpdate::new(AccountStatus::Probation).checked_at(NOW - 1_000),
            )
            .unwrap();

        assert_eq!(store.get_account("A").unwrap().unwrap().last_checked, Some(NOW));
    }

    #[test]
    fn unknown_address_reports_no_change() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        assert!(!store
            .update_status("missing", &StatusUpdate::new(AccountStatus::Probation))
            .unwrap());
    }

    #[test]
    fn breakdown_and_recovered_sum() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        seed(&store, "A", NOW);
        seed(&store, "B", NOW);
        seed(&store, "C", NOW);
        store
            .update_status(
                "A",
                &StatusUpdate::new(AccountStatus::Reclaimed).balance(1_000).reclaimed_at(NOW),
            )
            .unwrap();
        store
            .update_status(
                "B",
                &StatusUpdate::new(AccountStatus::Reclaimed).balance(2_500).reclaimed_at(NOW),
            )
            .unwrap();

        let breakdown = store.status_breakdown().unwrap();
        assert_eq!(breakdown.len(), AccountStatus::ALL.len());
        assert!(breakdown.contains(&(AccountStatus::Reclaimed, 2)));
        assert!(breakdown.contains(&(AccountStatus::Monitoring, 1)));
        assert!(breakdown.contains(&(AccountStatus::Error, 0)));
        assert_eq!(store.sum_balance_by_status(AccountStatus::Reclaimed).unwrap(), 3_500);
        assert_eq!(store.list_accounts().unwrap().len(), 3);
    }
}
