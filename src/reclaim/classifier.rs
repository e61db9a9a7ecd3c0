//! Account classification over raw on-chain account data

use solana_sdk::{account::Account, pubkey::Pubkey};

use crate::constants::{
    SPL_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_ACCOUNT_AMOUNT_OFFSET,
    TOKEN_ACCOUNT_OWNER_OFFSET,
};

/// Program ids the classifier compares owners against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    pub system_program: Pubkey,
    pub token_program: Pubkey,
}

impl Default for ProgramIds {
    fn default() -> Self {
        Self {
            system_program: SYSTEM_PROGRAM_ID,
            token_program: SPL_TOKEN_PROGRAM_ID,
        }
    }
}

/// Semantic kind of an inspected account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    /// The account no longer exists on chain
    Closed,
    SystemWallet { lamports: u64 },
    TokenAccount(TokenAccountInfo),
    /// Owned by a program the engine does not act on
    Other { owner: Pubkey, lamports: u64 },
}

impl AccountKind {
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Closed => "closed",
            AccountKind::SystemWallet { .. } => "system wallet",
            AccountKind::TokenAccount(_) => "token account",
            AccountKind::Other { .. } => "other program",
        }
    }
}

/// Token-program account with accessors over the fixed record layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountInfo {
    pub lamports: u64,
    data: Vec<u8>,
}

impl TokenAccountInfo {
    pub fn new(lamports: u64, data: Vec<u8>) -> Self {
        Self { lamports, data }
    }

    /// Token amount, `None` if the record is too short to hold it
    pub fn balance(&self) -> Option<u64> {
        read_token_amount(&self.data)
    }

    /// Owner (close authority) key, `None` if the record is too short
    pub fn owner(&self) -> Option<Pubkey> {
        read_token_owner(&self.data)
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }
}

/// Little-endian u64 at bytes 64..72
pub fn read_token_amount(data: &[u8]) -> Option<u64> {
    let bytes = data.get(TOKEN_ACCOUNT_AMOUNT_OFFSET..TOKEN_ACCOUNT_AMOUNT_OFFSET + 8)?;
    let array: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_le_bytes(array))
}

/// 32-byte key at bytes 32..64
pub fn read_token_owner(data: &[u8]) -> Option<Pubkey> {
    let bytes = data.get(TOKEN_ACCOUNT_OWNER_OFFSET..TOKEN_ACCOUNT_OWNER_OFFSET + 32)?;
    Pubkey::try_from(bytes).ok()
}

/// Classify raw account info. Absence is the `Closed` signal.
pub fn classify(account: Option<&Account>, programs: &ProgramIds) -> AccountKind {
    let Some(account) = account else {
        return AccountKind::Closed;
    };

    if account.owner == programs.system_program && account.data.is_empty() {
        return AccountKind::SystemWallet {
            lamports: account.lamports,
        };
    }

    if account.owner == programs.token_program {
        return AccountKind::TokenAccount(TokenAccountInfo::new(
            account.lamports,
            account.data.clone(),
        ));
    }

    AccountKind::Other {
        owner: account.owner,
        lamports: account.lamports,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 165-byte SPL token record with the given owner and amount
    pub(crate) fn token_account_data(owner: &Pubkey, amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; 165];
        data[..32].copy_from_slice(Pubkey::new_unique().as_ref());
        data[32..64].copy_from_slice(owner.as_ref());
        data[64..72].copy_from_slice(&amount.to_le_bytes());
        data
    }

    pub(crate) fn token_account(owner: &Pubkey, amount: u64, lamports: u64) -> Account {
        Account {
            lamports,
            data: token_account_data(owner, amount),
            owner: SPL_TOKEN_PROGRAM_ID,
            executable: false,
            rent_epoch: 0,
        }
    }

    #[test]
    fn absent_account_is_closed() {
        assert_eq!(classify(None, &ProgramIds::default()), AccountKind::Closed);
    }

    #[test]
    fn empty_system_account_is_wallet() {
        let account = Account::new(5_000, 0, &SYSTEM_PROGRAM_ID);
        assert_eq!(
            classify(Some(&account), &ProgramIds::default()),
            AccountKind::SystemWallet { lamports: 5_000 }
        );
    }

    #[test]
    fn system_account_with_data_is_other() {
        let account = Account::new(5_000, 80, &SYSTEM_PROGRAM_ID);
        assert!(matches!(
            classify(Some(&account), &ProgramIds::default()),
            AccountKind::Other { owner, .. } if owner == SYSTEM_PROGRAM_ID
        ));
    }

    #[test]
    fn token_layout_accessors() {
        let owner = Pubkey::new_unique();
        let account = token_account(&owner, 5, 2_039_280);

        let AccountKind::TokenAccount(info) = classify(Some(&account), &ProgramIds::default())
        else {
            panic!("expected token account");
        };
        assert_eq!(info.lamports, 2_039_280);
        assert_eq!(info.balance(), Some(5));
        assert_eq!(info.owner(), Some(owner));
    }

    #[test]
    fn truncated_token_record_exposes_nothing() {
        let info = TokenAccountInfo::new(1, vec![0u8; 40]);
        assert_eq!(info.balance(), None);
        assert_eq!(info.owner(), None);

        let owner_only = TokenAccountInfo::new(1, vec![7u8; 64]);
        assert!(owner_only.owner().is_some());
        assert_eq!(owner_only.balance(), None);
    }

    #[test]
    fn substituted_program_ids_are_honoured() {
        let custom_token_program = Pubkey::new_unique();
        let programs = ProgramIds {
            token_program: custom_token_program,
            ..ProgramIds::default()
        };
        let mut account = token_account(&Pubkey::new_unique(), 0, 10);
        account.owner = custom_token_program;
        assert!(matches!(
            classify(Some(&account), &programs),
            AccountKind::TokenAccount(_)
        ));

        account.owner = SPL_TOKEN_PROGRAM_ID;
        assert!(matches!(
            classify(Some(&account), &programs),
            AccountKind::Other { .. }
        ));
    }
}
