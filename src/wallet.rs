/// Operator identity
///
/// The operator keypair is the only key allowed to close accounts and the
/// beneficiary of reclaimed lamports. It is read once at start-up from the
/// configured environment variable (JSON byte array or base58), falling
/// back to a JSON keypair file, and checked against `operator.address`.
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::path::Path;
use std::str::FromStr;

use crate::config::OperatorConfig;
use crate::errors::ConfigurationError;
use crate::logger::{self, LogTag};

/// Parse a secret key given either as "[1,2,...]" or base58
pub fn parse_private_key(text: &str) -> Result<Keypair, ConfigurationError> {
    let text = text.trim();
    let bytes = if text.starts_with('[') {
        parse_array_format(text)?
    } else {
        bs58::decode(text)
            .into_vec()
            .map_err(|e| invalid_key(format!("Failed to decode base58 private key: {}", e)))?
    };

    if bytes.len() != 64 {
        return Err(invalid_key(format!(
            "Invalid private key length: expected 64 bytes, got {}",
            bytes.len()
        )));
    }

    Keypair::try_from(&bytes[..])
        .map_err(|e| invalid_key(format!("Failed to create keypair: {}", e)))
}

fn parse_array_format(text: &str) -> Result<Vec<u8>, ConfigurationError> {
    text.trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| s.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| invalid_key(format!("Failed to parse private key array: {}", e)))
}

fn invalid_key(error: String) -> ConfigurationError {
    ConfigurationError::InvalidPrivateKey { error }
}

/// Read a Solana CLI style keypair file (JSON byte array)
pub fn read_keypair_file(path: &Path) -> Result<Keypair, ConfigurationError> {
    if !path.exists() {
        return Err(ConfigurationError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| {
        invalid_key(format!("Failed to read keypair file '{}': {}", path.display(), e))
    })?;
    parse_private_key(&contents)
}

/// Fail when `expected` is set and differs from the keypair's public key
pub fn verify_identity(keypair: &Keypair, expected: &str) -> Result<(), ConfigurationError> {
    if expected.is_empty() {
        return Ok(());
    }

    let expected_key = Pubkey::from_str(expected).map_err(|e| ConfigurationError::InvalidConfig {
        field: "operator.address".to_string(),
        reason: e.to_string(),
    })?;

    if expected_key != keypair.pubkey() {
        return Err(ConfigurationError::KeypairMismatch {
            expected: expected.to_string(),
            actual: keypair.pubkey().to_string(),
        });
    }
    Ok(())
}

/// Resolve the operator keypair from an already-read env value or the file
pub fn resolve_operator_keypair(
    env_value: Option<String>,
    config: &OperatorConfig,
) -> Result<Keypair, ConfigurationError> {
    let keypair = match env_value.filter(|v| !v.trim().is_empty()) {
        Some(secret) => {
            logger::debug(
                LogTag::Wallet,
                &format!("Loading operator key from ${}", config.private_key_env),
            );
            parse_private_key(&secret)?
        }
        None => {
            logger::debug(
                LogTag::Wallet,
                &format!("Loading operator key from {}", config.keypair_path),
            );
            read_keypair_file(Path::new(&config.keypair_path))?
        }
    };

    verify_identity(&keypair, &config.address)?;
    Ok(keypair)
}

/// Load the operator keypair as configured
pub fn load_operator_keypair(config: &OperatorConfig) -> Result<Keypair, ConfigurationError> {
    let env_value = if config.private_key_env.is_empty() {
        None
    } else {
        std::env::var(&config.private_key_env).ok()
    };

    let keypair = resolve_operator_keypair(env_value, config)?;
    logger::info(
        LogTag::Wallet,
        &format!("Operator identity: {}", keypair.pubkey()),
    );
    Ok(keypair)
}
