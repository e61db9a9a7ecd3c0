/// Core logging implementation with automatic filtering
use super::config::{get_logger_config, is_debug_enabled_for_tag, LoggerConfig};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Filtering rules:
/// 1. Errors are always shown
/// 2. Anything above the minimum level is dropped
/// 3. Debug requires `--debug-<tag>` for that tag
/// 4. Verbose requires `--verbose`
pub(super) fn should_log(config: &LoggerConfig, tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    if level > config.min_level {
        return false;
    }

    match level {
        LogLevel::Debug => {
            is_debug_enabled_for_tag(config, tag) || config.min_level == LogLevel::Verbose
        }
        LogLevel::Verbose => config.min_level == LogLevel::Verbose,
        _ => true,
    }
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    let config = get_logger_config();
    if !should_log(&config, &tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, message, config.file_logging);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn errors_always_pass() {
        let config = LoggerConfig {
            min_level: LogLevel::Error,
            ..Default::default()
        };
        assert!(should_log(&config, &LogTag::Rpc, LogLevel::Error));
        assert!(!should_log(&config, &LogTag::Rpc, LogLevel::Info));
    }

    #[test]
    fn debug_is_gated_per_tag() {
        let mut debug_tags = HashSet::new();
        debug_tags.insert("rpc".to_string());
        let config = LoggerConfig {
            min_level: LogLevel::Debug,
            debug_tags,
            file_logging: false,
        };

        assert!(should_log(&config, &LogTag::Rpc, LogLevel::Debug));
        assert!(!should_log(&config, &LogTag::Reclaim, LogLevel::Debug));
        assert!(!should_log(&config, &LogTag::Rpc, LogLevel::Verbose));
        assert!(should_log(&config, &LogTag::Reclaim, LogLevel::Info));
    }
}
