use thiserror::Error;

use promptvault_types::{Address, Identity, VaultError};

/// Errors returned by account store backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record already exists at {0}")]
    AlreadyExists(Address),

    #[error("no record at {0}")]
    NotFound(Address),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Errors returned by token ledger backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        account: Identity,
        requested: u64,
        available: u64,
    },

    #[error("transfer amount overflow")]
    Overflow,
}

impl From<StoreError> for VaultError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(address) => Self::NotFound(address.to_string()),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<TransferError> for VaultError {
    fn from(value: TransferError) -> Self {
        Self::TransferFailed(value.to_string())
    }
}
