/// Solana blockchain error classification
///
/// Structured inspection of `TransactionError` values returned by
/// preflight simulation or confirmation, replacing string matching where
/// the RPC hands back a typed error. Program-log scanning remains as the
/// fallback for responses that only carry logs.
use serde::{Deserialize, Serialize};
use solana_sdk::instruction::InstructionError;
use solana_sdk::transaction::TransactionError;
use std::fmt;

/// Structured Solana transaction error details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFailure {
    pub instruction_index: Option<u8>,
    pub error_code: Option<u32>,
    pub error_name: String,
    pub description: String,
}

impl fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instruction_index {
            Some(index) => write!(
                f,
                "{} (instruction {}): {}",
                self.error_name, index, self.description
            ),
            None => write!(f, "{}: {}", self.error_name, self.description),
        }
    }
}

/// Parse a transaction error into its structured form
pub fn parse_transaction_error(error: &TransactionError) -> ChainFailure {
    match error {
        TransactionError::InstructionError(index, detail) => {
            parse_instruction_error(*index, detail)
        }
        other => parse_transaction_level_error(other),
    }
}

/// Parse instruction-level errors (custom codes and built-in errors)
fn parse_instruction_error(instruction_index: u8, detail: &InstructionError) -> ChainFailure {
    let (error_code, description) = match detail {
        InstructionError::Custom(code) => {
            (Some(*code), describe_token_custom_error(*code).to_string())
        }
        InstructionError::InvalidAccountData => (
            None,
            "Account data is invalid for this instruction (account may already be closed)"
                .to_string(),
        ),
        InstructionError::UninitializedAccount => {
            (None, "Account is not initialized".to_string())
        }
        InstructionError::MissingRequiredSignature => {
            (None, "A required signature is missing".to_string())
        }
        InstructionError::InsufficientFunds => {
            (None, "Insufficient funds for the instruction".to_string())
        }
        InstructionError::IncorrectProgramId => {
            (None, "Account is not owned by the invoked program".to_string())
        }
        other => (None, format!("Instruction failed: {:?}", other)),
    };

    ChainFailure {
        instruction_index: Some(instruction_index),
        error_code,
        error_name: instruction_error_name(detail),
        description,
    }
}

/// Parse transaction-level errors (BlockhashNotFound and friends)
fn parse_transaction_level_error(error: &TransactionError) -> ChainFailure {
    let description = match error {
        TransactionError::BlockhashNotFound => "Transaction blockhash has expired",
        TransactionError::AccountInUse => "Account is being used by another transaction",
        TransactionError::WouldExceedMaxBlockCostLimit => {
            "Transaction would exceed block cost limit"
        }
        TransactionError::AlreadyProcessed => "Transaction has already been processed",
        TransactionError::InsufficientFundsForFee => "Insufficient SOL to pay transaction fee",
        TransactionError::SignatureFailure => "Transaction signature verification failed",
        TransactionError::AccountNotFound => "Fee payer account does not exist",
        TransactionError::SanitizeFailure => "Transaction failed sanitization checks",
        _ => "Unknown transaction error",
    };

    ChainFailure {
        instruction_index: None,
        error_code: None,
        error_name: format!("{:?}", error),
        description: description.to_string(),
    }
}

fn instruction_error_name(detail: &InstructionError) -> String {
    match detail {
        InstructionError::Custom(code) => format!("Custom({})", code),
        other => {
            let debug = format!("{:?}", other);
            debug.split('(').next().unwrap_or(&debug).to_string()
        }
    }
}

/// SPL token program custom error codes relevant to closing accounts
fn describe_token_custom_error(code: u32) -> &'static str {
    match code {
        1 => "Insufficient funds",
        4 => "Owner does not match",
        9 => "Invalid instruction",
        11 => "Non-native account can only be closed if its balance is zero",
        13 => "Account is frozen",
        _ => "Custom program error",
    }
}

// =============================================================================
// "ALREADY CLOSED" SIGNAL
// =============================================================================

/// Structured check: the token program rejected the account as invalid data
pub fn is_invalid_account_data(error: &TransactionError) -> bool {
    matches!(
        error,
        TransactionError::InstructionError(_, InstructionError::InvalidAccountData)
    )
}

/// Log-based fallback for RPC responses that only carry program logs
pub fn logs_indicate_invalid_account_data(logs: &[String]) -> bool {
    logs.iter().any(|line| {
        let lower = line.to_lowercase();
        lower.contains("invalidaccountdata") || lower.contains("invalid account data")
    })
}
