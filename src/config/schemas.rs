/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the `config_struct!` macro which provides
/// embedded defaults and serde support with `#[serde(default)]`.
use crate::config_struct;
use crate::constants::{BATCH_SIZE, DEFAULT_MAX_RETRIES, RETRY_BACKOFF_MS};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

// ============================================================================
// RECLAIM ENGINE
// ============================================================================

config_struct! {
    /// Reclaim engine behaviour
    pub struct ReclaimConfig {
        /// Log decisions but never submit close transactions
        dry_run: bool = false,
        /// Close-transaction attempts before surfacing the blockhash error
        max_retries: u32 = DEFAULT_MAX_RETRIES,
        /// Accounts inspected per cycle
        batch_size: usize = BATCH_SIZE,
        /// Cooldown before funded accounts are inspected again
        probation_period_days: u32 = 60,
        /// Fixed wait between blockhash-expiry retries
        retry_backoff_ms: u64 = RETRY_BACKOFF_MS,
        /// Signature status polling interval while confirming
        confirm_poll_interval_ms: u64 = 500,

        // Advisory thresholds kept from the original schema; the engine does
        // not enforce them.
        min_rent_balance: u64 = 2_500_000,
        max_inactive_days: u32 = 30,
        min_tx_count_safety: u32 = 10,
    }
}

// ============================================================================
// RPC
// ============================================================================

config_struct! {
    /// Chain RPC endpoint
    pub struct RpcConfig {
        url: String = "https://api.devnet.solana.com".to_string(),
        timeout_secs: u64 = 30,
    }
}

// ============================================================================
// OPERATOR
// ============================================================================

config_struct! {
    /// Operator identity (the only key allowed to close accounts)
    pub struct OperatorConfig {
        /// Expected operator public key; empty skips the identity check
        address: String = String::new(),
        /// JSON keypair file used when the env var is not set
        keypair_path: String = "operator-keypair.json".to_string(),
        /// Env var holding the secret key (JSON byte array or base58)
        private_key_env: String = "RECLAIMER_OPERATOR_PRIVATE_KEY".to_string(),
    }
}

// ============================================================================
// DATABASE
// ============================================================================

config_struct! {
    pub struct DatabaseConfig {
        /// SQLite file; empty uses the data directory default
        path: String = String::new(),
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

config_struct! {
    /// Host loop cadence
    pub struct SchedulerConfig {
        interval_secs: u64 = 60,
        sync_enabled: bool = true,
        /// Operator signatures scanned per sync
        sync_history_limit: usize = 10,
    }
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

config_struct! {
    pub struct TelegramConfig {
        enabled: bool = false,
        bot_token: String = String::new(),
        chat_id: String = String::new(),
    }
}

config_struct! {
    pub struct EmailConfig {
        enabled: bool = false,
        /// Resend API key
        api_key: String = String::new(),
        to: String = String::new(),
        from: String = "Rent Reclaimer <alerts@rent-reclaimer.dev>".to_string(),
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root configuration
    pub struct Config {
        reclaim: ReclaimConfig = ReclaimConfig::default(),
        rpc: RpcConfig = RpcConfig::default(),
        operator: OperatorConfig = OperatorConfig::default(),
        database: DatabaseConfig = DatabaseConfig::default(),
        scheduler: SchedulerConfig = SchedulerConfig::default(),
        telegram: TelegramConfig = TelegramConfig::default(),
        email: EmailConfig = EmailConfig::default(),
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

impl ReclaimConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("reclaim.max_retries must be at least 1".to_string());
        }
        if self.batch_size == 0 {
            return Err("reclaim.batch_size must be at least 1".to_string());
        }
        if self.probation_period_days == 0 {
            return Err("reclaim.probation_period_days must be at least 1".to_string());
        }
        if self.confirm_poll_interval_ms == 0 {
            return Err("reclaim.confirm_poll_interval_ms must be > 0".to_string());
        }
        Ok(())
    }
}

impl RpcConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("rpc.url cannot be empty".to_string());
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(format!("rpc.url must be an http(s) URL, got '{}'", self.url));
        }
        if self.timeout_secs == 0 {
            return Err("rpc.timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

impl OperatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.address.is_empty() {
            Pubkey::from_str(&self.address)
                .map_err(|e| format!("operator.address '{}' is invalid: {}", self.address, e))?;
        }
        if self.keypair_path.is_empty() && self.private_key_env.is_empty() {
            return Err("operator needs keypair_path or private_key_env".to_string());
        }
        Ok(())
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_secs == 0 {
            return Err("scheduler.interval_secs must be > 0".to_string());
        }
        Ok(())
    }
}

impl TelegramConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled {
            if self.bot_token.is_empty() {
                return Err("telegram.bot_token is required when telegram is enabled".to_string());
            }
            self.chat_id
                .parse::<i64>()
                .map_err(|e| format!("telegram.chat_id '{}' is invalid: {}", self.chat_id, e))?;
        }
        Ok(())
    }
}

impl EmailConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && (self.api_key.is_empty() || self.to.is_empty()) {
            return Err("email.api_key and email.to are required when email is enabled".to_string());
        }
        Ok(())
    }
}

impl Config {
    /// Validate every section, failing on the first violation
    pub fn validate(&self) -> Result<(), String> {
        self.reclaim.validate()?;
        self.rpc.validate()?;
        self.operator.validate()?;
        self.scheduler.validate()?;
        self.telegram.validate()?;
        self.email.validate()?;
        Ok(())
    }
}
