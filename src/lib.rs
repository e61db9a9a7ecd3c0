pub mod arguments;
pub mod config;
pub mod constants;
pub mod database;
pub mod errors; // Structured error handling
pub mod logger;
pub mod notifications;
pub mod paths;
pub mod reclaim; // Classification, selection, submission, state machine
pub mod rpc;
pub mod run;
pub mod scheduler;
pub mod stats;
pub mod sync; // Discovery of newly created accounts
pub mod wallet; // Operator keypair loading
