/// Subsystem tags attached to every log line

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Reclaim,
    Classifier,
    Selector,
    Submitter,
    Rpc,
    Database,
    Notify,
    Sync,
    Scheduler,
    Wallet,
}

impl LogTag {
    /// Uppercase label used in console and file output
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Reclaim => "RECLAIM",
            LogTag::Classifier => "CLASSIFY",
            LogTag::Selector => "SELECTOR",
            LogTag::Submitter => "SUBMIT",
            LogTag::Rpc => "RPC",
            LogTag::Database => "DATABASE",
            LogTag::Notify => "NOTIFY",
            LogTag::Sync => "SYNC",
            LogTag::Scheduler => "SCHEDULER",
            LogTag::Wallet => "WALLET",
        }
    }

    /// Key matched against `--debug-<key>` flags
    pub fn to_debug_key(&self) -> String {
        self.to_plain_string().to_lowercase()
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
