//! Centralized path resolution for the reclaimer
//!
//! All file and directory paths are resolved through this module so the
//! daemon, one-shot runs and tests agree on where things live.
//!
//! ## Directory Structure
//!
//! ```text
//! <data_local_dir>/RentReclaimer/
//! ├── data/
//! │ ├── config.toml
//! │ └── reclaimer.db
//! └── logs/
//!   └── reclaimer_YYYY-MM-DD.log
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;

const APP_DIR: &str = "RentReclaimer";

/// Lazy-initialized base directory (thread-safe)
static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(resolve_base_directory);

/// Resolves the base directory using platform application data locations,
/// falling back to the home directory and finally the working directory.
fn resolve_base_directory() -> PathBuf {
  if let Some(dir) = dirs::data_local_dir() {
    return dir.join(APP_DIR);
  }

  if let Some(dir) = dirs::data_dir() {
    return dir.join(APP_DIR);
  }

  if let Some(home) = dirs::home_dir() {
    return home.join(APP_DIR);
  }

  PathBuf::from(APP_DIR)
}

/// Returns the base directory for all reclaimer data
pub fn get_base_directory() -> PathBuf {
  BASE_DIRECTORY.clone()
}

/// Returns the data directory path (config and database)
pub fn get_data_directory() -> PathBuf {
  BASE_DIRECTORY.join("data")
}

/// Returns the logs directory path
pub fn get_logs_directory() -> PathBuf {
  BASE_DIRECTORY.join("logs")
}

/// Returns the main configuration file path
pub fn get_config_path() -> PathBuf {
  get_data_directory().join("config.toml")
}

/// Returns the tracked-accounts database path
pub fn get_accounts_db_path() -> PathBuf {
  get_data_directory().join("reclaimer.db")
}

/// Creates the data and logs directories if they are missing
///
/// Must run before `logger::init()` since the file sink opens a log file
/// inside the logs directory.
pub fn ensure_all_directories() -> Result<(), String> {
  let dirs_to_create = [
    ("data", get_data_directory()),
    ("logs", get_logs_directory()),
  ];

  for (name, dir) in dirs_to_create {
    if !dir.exists() {
      std::fs::create_dir_all(&dir).map_err(|e| {
        format!(
          "Failed to create {} directory at {}: {}",
          name,
          dir.display(),
          e
        )
      })?;

      eprintln!("Created directory: {}", dir.display());
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_base_directory_not_empty() {
    let base = get_base_directory();
    assert!(!base.as_os_str().is_empty());
  }

  #[test]
  fn test_files_live_under_base() {
    let base = get_base_directory();
    assert!(get_data_directory().starts_with(&base));
    assert!(get_logs_directory().starts_with(&base));
    assert!(get_config_path().starts_with(get_data_directory()));
    assert!(get_accounts_db_path().starts_with(get_data_directory()));
  }
}
