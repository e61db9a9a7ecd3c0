//! Reclaim engine
//!
//! - `classifier`: raw account data to `AccountKind`
//! - `selector`: which tracked accounts are due this cycle
//! - `submitter`: close transaction with blockhash-expiry retries
//! - `engine`: state machine and cycle runner
//! - `summary`: per-cycle outcome tally

pub mod classifier;
pub mod engine;
pub mod selector;
pub mod submitter;
pub mod summary;

pub use classifier::{classify, AccountKind, ProgramIds, TokenAccountInfo};
pub use engine::{decide, Decision, ReclaimEngine, ReclaimSettings};
pub use submitter::{submit_close, SubmitError, SubmitPolicy};
pub use summary::{AccountOutcome, AccountReport, CycleSummary, OutcomeCategory};
