use rent_reclaimer::{
    arguments::{get_enabled_debug_modes, patterns, print_help},
    logger::{self as logger, LogTag},
};

/// Main entry point for the rent reclaimer
///
/// - `--help`: usage and exit
/// - `--stats`, `--sync-only`, `--once`: run one action and exit
/// - default: scheduler loop until Ctrl-C
#[tokio::main]
async fn main() {
    // Logger needs the logs directory to exist
    if let Err(e) = rent_reclaimer::paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    logger::init();

    if patterns::is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "🚀 Rent reclaimer starting up...");

    let debug_modes = get_enabled_debug_modes();
    if !debug_modes.is_empty() {
        logger::info(
            LogTag::System,
            &format!("Debug logging enabled for: {}", debug_modes.join(", ")),
        );
    }

    let result = rent_reclaimer::run::run_reclaimer().await;
    logger::flush();

    if let Err(e) = result {
        logger::error(LogTag::System, &format!("❌ Rent reclaimer failed: {:#}", e));
        logger::flush();
        std::process::exit(1);
    }

    logger::info(LogTag::System, "✅ Rent reclaimer stopped");
    logger::flush();
}
