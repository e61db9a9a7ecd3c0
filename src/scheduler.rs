/// Host loop
///
/// A single worker task runs one tick per interval: the discovery sync (when
/// enabled) followed by one reclaim cycle. Failures are logged and the loop
/// waits for the next tick. Shutdown is only observed between ticks, so a
/// cycle always runs to the end of its batch.
use solana_sdk::signature::{Keypair, Signer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::logger::{self, LogTag};
use crate::reclaim::{CycleSummary, ReclaimEngine};
use crate::sync::{sync_recent_accounts, HistorySource, SyncReport};

/// Cloneable stop flag shared with the Ctrl-C handler
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        let notified = self.notify.notified();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}

/// Route Ctrl-C to `signal`
pub fn install_ctrlc_handler(signal: ShutdownSignal) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        println!("\n🛑 Received Ctrl+C, stopping after the current cycle...");
        signal.trigger();
    })
}

/// Outcome of one tick
#[derive(Debug, Default)]
pub struct TickReport {
    pub sync: Option<SyncReport>,
    pub cycle: Option<CycleSummary>,
}

pub struct Scheduler {
    engine: Arc<ReclaimEngine>,
    history: Option<Arc<dyn HistorySource>>,
    operator: Arc<Keypair>,
    interval: Duration,
    sync_history_limit: usize,
}

impl Scheduler {
    /// `history: None` disables the discovery sync
    pub fn new(
        engine: Arc<ReclaimEngine>,
        history: Option<Arc<dyn HistorySource>>,
        operator: Arc<Keypair>,
        interval: Duration,
        sync_history_limit: usize,
    ) -> Self {
        Self {
            engine,
            history,
            operator,
            interval,
            sync_history_limit,
        }
    }

    /// Discovery sync only
    pub async fn sync_once(&self) -> Option<SyncReport> {
        let history = self.history.as_ref()?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        match sync_recent_accounts(
            history.as_ref(),
            self.engine.store().as_ref(),
            &self.operator.pubkey(),
            self.sync_history_limit,
            now_ms,
        )
        .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                logger::error(LogTag::Sync, &format!("Sync failed: {}", e));
                None
            }
        }
    }

    /// Sync, then one reclaim cycle
    pub async fn tick(&self) -> TickReport {
        let sync = self.sync_once().await;

        let cycle = match self.engine.run_cycle(&self.operator).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                logger::error(
                    LogTag::Scheduler,
                    &format!("Reclaim cycle failed, retrying next tick: {}", e),
                );
                None
            }
        };

        TickReport { sync, cycle }
    }

    /// Run ticks on one worker task until `shutdown` fires
    pub async fn run(self: Arc<Self>, shutdown: ShutdownSignal) {
        logger::info(
            LogTag::Scheduler,
            &format!("Scheduler started (interval {}s)", self.interval.as_secs()),
        );

        let worker = tokio::spawn(async move {
            let mut ticks: u64 = 0;
            while !shutdown.is_requested() {
                ticks += 1;
                logger::debug(LogTag::Scheduler, &format!("Tick #{}", ticks));
                self.tick().await;

                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = shutdown.wait() => {}
                }
            }
            ticks
        });

        match worker.await {
            Ok(ticks) => logger::info(
                LogTag::Scheduler,
                &format!("Scheduler stopped after {} tick(s)", ticks),
            ),
            Err(e) => logger::error(LogTag::Scheduler, &format!("Scheduler task failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{AccountStatus, AccountStore, NewAccount, SqliteAccountStore};
    use crate::notifications::testing::RecordingNotifier;
    use crate::reclaim::ReclaimSettings;
    use crate::rpc::testing::MockChain;
    use crate::sync::{HistoricalTransaction, ParsedCall};
    use serde_json::json;
    use solana_sdk::pubkey::Pubkey;

    fn scheduler(
        store: Arc<SqliteAccountStore>,
        chain: Arc<MockChain>,
        operator: Arc<Keypair>,
        with_sync: bool,
    ) -> Scheduler {
        let engine = Arc::new(ReclaimEngine::new(
            store,
            chain.clone(),
            Arc::new(RecordingNotifier::new()),
            ReclaimSettings::default(),
        ));
        let history: Option<Arc<dyn HistorySource>> = if with_sync {
            Some(chain)
        } else {
            None
        };
        Scheduler::new(engine, history, operator, Duration::from_millis(10), 10)
    }

    #[tokio::test]
    async fn tick_syncs_then_reclaims() {
        let store = Arc::new(SqliteAccountStore::open_in_memory().unwrap());
        let chain = Arc::new(MockChain::new());
        let operator = Arc::new(Keypair::new());
        let created = Pubkey::new_unique();

        chain.set_history(vec![HistoricalTransaction {
            signature: "sig".to_string(),
            fee_payer: Some(operator.pubkey().to_string()),
            block_time: Some(1_700_000_000),
            instructions: vec![ParsedCall {
                program: "system".to_string(),
                parsed: json!({
                    "type": "createAccount",
                    "info": { "newAccount": created.to_string(), "lamports": 2_039_280 }
                }),
            }],
        }]);
        chain.set_account(created, None);

        let report = scheduler(store.clone(), chain, operator, true).tick().await;

        assert_eq!(report.sync.unwrap().added, 1);
        assert_eq!(report.cycle.unwrap().reclaimed(), 1);
        assert_eq!(
            store.get_account(&created.to_string()).unwrap().unwrap().status,
            AccountStatus::Reclaimed
        );
    }

    #[tokio::test]
    async fn sync_failure_does_not_skip_the_cycle() {
        let store = Arc::new(SqliteAccountStore::open_in_memory().unwrap());
        let chain = Arc::new(MockChain::new());
        chain.fail_history("rate limited");
        let tracked = Pubkey::new_unique();
        store
            .insert_if_absent(&NewAccount {
                address: tracked.to_string(),
                owner_program: "SystemProgram".to_string(),
                balance_lamports: 1,
                last_active_at: 0,
                created_at: 0,
            })
            .unwrap();
        chain.set_account(tracked, None);

        let report = scheduler(store, chain, Arc::new(Keypair::new()), true).tick().await;

        assert!(report.sync.is_none());
        assert_eq!(report.cycle.unwrap().processed(), 1);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let store = Arc::new(SqliteAccountStore::open_in_memory().unwrap());
        let chain = Arc::new(MockChain::new());
        let sched = Arc::new(scheduler(store, chain, Arc::new(Keypair::new()), false));

        let shutdown = ShutdownSignal::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(5), sched.run(shutdown))
            .await
            .expect("scheduler did not stop");
    }

    #[tokio::test]
    async fn signal_observed_before_wait() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        assert!(shutdown.is_requested());
        tokio::time::timeout(Duration::from_millis(100), shutdown.wait())
            .await
            .unwrap();
    }
}
