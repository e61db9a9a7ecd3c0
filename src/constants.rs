/// Global constants used across the reclaimer
///
/// Chain identifiers, the token-account binary layout and the scheduling
/// thresholds of the reclaim engine. The engine never reads these directly;
/// they seed `ProgramIds` and `ReclaimSettings`, which tests can substitute.
use solana_sdk::pubkey::Pubkey;

// ============================================================================
// SOLANA BLOCKCHAIN CONSTANTS
// ============================================================================

/// Lamports per SOL (10^9)
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Native system program (owner of plain wallets)
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk::system_program::ID;

/// Classic SPL token program
pub const SPL_TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;

// ============================================================================
// TOKEN ACCOUNT LAYOUT (fixed ABI, not configurable)
// ============================================================================

/// Owner public key occupies bytes 32..64 of a token account record
pub const TOKEN_ACCOUNT_OWNER_OFFSET: usize = 32;

/// Little-endian u64 token amount at bytes 64..72
pub const TOKEN_ACCOUNT_AMOUNT_OFFSET: usize = 64;

/// Shortest record that exposes both owner and amount
pub const TOKEN_ACCOUNT_MIN_LEN: usize = TOKEN_ACCOUNT_AMOUNT_OFFSET + 8;

// ============================================================================
// RECLAIM ENGINE DEFAULTS
// ============================================================================

/// Maximum accounts inspected per cycle
pub const BATCH_SIZE: usize = 5;

/// Cooldown before a probation account is inspected again (60 days)
pub const PROBATION_PERIOD_MS: i64 = 60 * 24 * 60 * 60 * 1000;

/// Close-transaction submission attempts before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed wait between blockhash-expiry retries
pub const RETRY_BACKOFF_MS: u64 = 1_000;

/// One day in milliseconds
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Convert lamports to SOL for display
pub fn lamports_to_sol(lamports: u64) -> f64 {
    (lamports as f64) / (LAMPORTS_PER_SOL as f64)
}
