/// Process lifecycle: configuration, collaborators, then the selected mode
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::arguments;
use crate::config::{self, Config};
use crate::database::SqliteAccountStore;
use crate::logger::{self, LogTag};
use crate::notifications::NotifierSet;
use crate::reclaim::{ReclaimEngine, ReclaimSettings};
use crate::rpc::SolanaRpc;
use crate::scheduler::{install_ctrlc_handler, Scheduler, ShutdownSignal};
use crate::stats;
use crate::sync::HistorySource;
use crate::wallet;

/// Load and validate configuration, then apply command-line overrides
pub fn load_runtime_config() -> Result<Config> {
    let loaded = match arguments::get_config_path_override() {
        Some(path) => config::load_config_from_path(&path),
        None => config::load_config(),
    };
    loaded
        .map_err(anyhow::Error::msg)
        .context("Configuration is invalid")?;

    let mut config = config::get_config_clone();
    if arguments::is_dry_run_enabled() {
        config.reclaim.dry_run = true;
    }

    logger::info(
        LogTag::Config,
        &format!(
            "Configuration loaded (rpc {}, batch {}, max retries {}, {})",
            config.rpc.url,
            config.reclaim.batch_size,
            config.reclaim.max_retries,
            if config.reclaim.dry_run { "DRY RUN" } else { "LIVE" }
        ),
    );
    Ok(config)
}

fn database_path(config: &Config) -> PathBuf {
    if config.database.path.is_empty() {
        crate::paths::get_accounts_db_path()
    } else {
        PathBuf::from(&config.database.path)
    }
}

pub async fn run_reclaimer() -> Result<()> {
    let config = load_runtime_config()?;

    let db_path = database_path(&config);
    let store = Arc::new(
        SqliteAccountStore::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?,
    );

    if arguments::is_stats_enabled() {
        let report = stats::collect(store.as_ref()).context("Failed to collect stats")?;
        println!("{}", report);
        return Ok(());
    }

    let operator = Arc::new(
        wallet::load_operator_keypair(&config.operator)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to load operator keypair")?,
    );

    let rpc = Arc::new(SolanaRpc::from_config(&config.rpc, &config.reclaim));
    let notifier = Arc::new(
        NotifierSet::from_config(&config)
            .map_err(anyhow::Error::msg)
            .context("Failed to configure notifications")?,
    );

    let engine = Arc::new(ReclaimEngine::new(
        store,
        rpc.clone(),
        notifier,
        ReclaimSettings::from_config(&config.reclaim),
    ));

    let history: Option<Arc<dyn HistorySource>> =
        if config.scheduler.sync_enabled || arguments::is_sync_only_enabled() {
            Some(rpc)
        } else {
            None
        };

    let scheduler = Arc::new(Scheduler::new(
        engine,
        history,
        operator,
        Duration::from_secs(config.scheduler.interval_secs),
        config.scheduler.sync_history_limit,
    ));

    if arguments::is_sync_only_enabled() {
        let report = scheduler
            .sync_once()
            .await
            .context("Sync did not complete")?;
        println!("Scanned {} transaction(s), added {} account(s)", report.scanned, report.added);
        return Ok(());
    }

    if arguments::is_once_enabled() {
        let tick = scheduler.tick().await;
        let summary = tick.cycle.context("Reclaim cycle failed")?;
        for line in summary.transcript() {
            println!("{}", line);
        }
        println!("{}", summary.headline());
        return Ok(());
    }

    let shutdown = ShutdownSignal::new();
    install_ctrlc_handler(shutdown.clone()).context("Failed to install Ctrl-C handler")?;
    scheduler.run(shutdown).await;
    Ok(())
}
