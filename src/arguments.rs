/// Centralized command-line argument handling
///
/// The reclaimer keeps its CLI surface small: a handful of mode flags plus
/// per-module `--debug-<tag>` switches consumed by the logger.
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Tests override it through `set_cmd_args`.
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// MODE FLAGS
// =============================================================================

/// Run a single sync + reclaim tick and exit
pub fn is_once_enabled() -> bool {
    has_arg("--once")
}

/// Run only the discovery sync and exit
pub fn is_sync_only_enabled() -> bool {
    has_arg("--sync-only")
}

/// Print the status breakdown and exit
pub fn is_stats_enabled() -> bool {
    has_arg("--stats")
}

/// Force dry-run mode regardless of the config file
pub fn is_dry_run_enabled() -> bool {
    has_arg("--dry-run")
}

/// Alternate config file location
pub fn get_config_path_override() -> Option<String> {
    get_arg_value("--config")
}

/// Collects every `--debug-<module>` flag as lowercase module keys
pub fn get_enabled_debug_modes() -> Vec<String> {
    get_cmd_args()
        .iter()
        .filter_map(|a| a.strip_prefix("--debug-"))
        .map(|m| m.to_lowercase())
        .collect()
}

pub fn print_help() {
    println!("rent-reclaimer - reclaim stranded rent from operator-sponsored accounts");
    println!();
    println!("USAGE:");
    println!("    rent-reclaimer [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --once              Run one sync + reclaim cycle and exit");
    println!("    --sync-only         Discover new accounts and exit");
    println!("    --stats             Print the account status breakdown and exit");
    println!("    --dry-run           Never submit close transactions");
    println!("    --config <PATH>     Use an alternate config.toml");
    println!("    --debug-<module>    Debug logs for one module (reclaim, rpc, sync, ...)");
    println!("    --verbose, -v       Very detailed tracing");
    println!("    --help, -h          Show this help");
}

pub mod patterns {
    use super::*;

    /// Checks for help flags
    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }

    /// Checks for verbose mode
    pub fn is_verbose_mode() -> bool {
        has_arg("--verbose") || has_arg("-v")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // CMD_ARGS is process-global; keep every assertion in one test so
    // parallel test threads never observe each other's arguments.
    #[test]
    fn test_argument_helpers() {
        set_cmd_args(vec![
            "rent-reclaimer".to_string(),
            "--once".to_string(),
            "--config".to_string(),
            "/tmp/custom.toml".to_string(),
            "--debug-Reclaim".to_string(),
            "--debug-rpc".to_string(),
        ]);

        assert!(is_once_enabled());
        assert!(!is_stats_enabled());
        assert!(!is_dry_run_enabled());
        assert_eq!(get_config_path_override(), Some("/tmp/custom.toml".to_string()));
        assert_eq!(get_arg_value("--missing"), None);
        assert_eq!(
            get_enabled_debug_modes(),
            vec!["reclaim".to_string(), "rpc".to_string()]
        );
        assert!(!patterns::is_help_requested());
    }
}
