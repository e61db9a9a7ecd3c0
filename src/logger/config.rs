/// Runtime logger configuration
///
/// Populated from command-line flags at startup; tests and embedders can
/// replace it with `set_logger_config`.
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::{get_enabled_debug_modes, patterns};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped
    pub min_level: LogLevel,
    /// Tags with `--debug-<tag>` enabled
    pub debug_tags: HashSet<String>,
    /// Whether file output is enabled
    pub file_logging: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            file_logging: true,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Build the logger configuration from command-line flags
pub fn init_from_args() {
    let debug_tags: HashSet<String> = get_enabled_debug_modes().into_iter().collect();

    let min_level = if patterns::is_verbose_mode() {
        LogLevel::Verbose
    } else if !debug_tags.is_empty() {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    set_logger_config(LoggerConfig {
        min_level,
        debug_tags,
        file_logging: true,
    });
}

pub(super) fn is_debug_enabled_for_tag(config: &LoggerConfig, tag: &LogTag) -> bool {
    config.debug_tags.contains(&tag.to_debug_key()) || config.debug_tags.contains("all")
}
