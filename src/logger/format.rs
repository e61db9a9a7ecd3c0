//! Log formatting and output
//!
//! Console lines are colorized `HH:MM:SS [TAG] [LEVEL] message`; the file
//! sink receives the same line uncolored with a full date. Continuation
//! lines of multi-line messages are indented under the message column.

use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 9;
const LEVEL_WIDTH: usize = 7;

/// Format and output a log message
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str, to_file: bool) {
    let now = Local::now();
    let time = now.format("%H:%M:%S").to_string();

    let base_line = format!(
        "{} [{}] [{}] ",
        time.dimmed(),
        format_tag(&tag),
        format_level(level)
    );
    let indent = " ".repeat(time.len() + TAG_WIDTH + LEVEL_WIDTH + 7);

    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();

    for (i, line) in message.split('\n').enumerate() {
        let console_line = if i == 0 {
            format!("{}{}", base_line, colorize_message(level, line))
        } else {
            format!("{}{}", indent, colorize_message(level, line))
        };
        print_stdout_safe(&console_line);

        if to_file {
            write_to_file(&format!(
                "{} [{}] [{}] {}",
                timestamp,
                tag.to_plain_string(),
                level.as_str(),
                line
            ));
        }
    }
}

/// Format a tag with appropriate color
fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System | LogTag::Scheduler => padded.bright_yellow().bold(),
        LogTag::Config => padded.white().bold(),
        LogTag::Reclaim => padded.bright_green().bold(),
        LogTag::Classifier | LogTag::Selector => padded.bright_cyan().bold(),
        LogTag::Submitter => padded.bright_magenta().bold(),
        LogTag::Rpc => padded.bright_blue().bold(),
        LogTag::Database => padded.blue().bold(),
        LogTag::Notify => padded.bright_white().bold(),
        LogTag::Sync => padded.cyan().bold(),
        LogTag::Wallet => padded.magenta().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let padded = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => padded.bright_red().bold(),
        LogLevel::Warning => padded.yellow().bold(),
        LogLevel::Info => padded.white().bold(),
        LogLevel::Debug | LogLevel::Verbose => padded.dimmed(),
    }
}

fn colorize_message(level: LogLevel, line: &str) -> ColoredString {
    match level {
        LogLevel::Error => line.red(),
        LogLevel::Warning => line.yellow(),
        LogLevel::Debug | LogLevel::Verbose => line.dimmed(),
        LogLevel::Info => line.normal(),
    }
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    if let Err(e) = stdout().flush() {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}
