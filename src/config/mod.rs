//! Configuration system
//!
//! Typed TOML configuration with embedded defaults, validated once at
//! startup. Runtime components receive derived settings values rather than
//! reading the global directly.

#[macro_use]
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::*;
pub use utils::{get_config_clone, load_config, load_config_from_path, parse_config, with_config};
