use serde::{Deserialize, Serialize};

use promptvault_types::{ExecutionRecord, PromptData, StakeAccount, StakePool, VaultState};

/// Discriminant for the record families a store can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Vault,
    Prompt,
    Stake,
    StakePool,
    Execution,
}

/// A typed record as persisted under one derived address.
///
/// Address derivation keys each family with its own namespace tag, so two
/// logically distinct records never alias; the kind accessors exist to turn
/// an impossible mix-up into an explicit store fault instead of a panic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountRecord {
    Vault(VaultState),
    Prompt(PromptData),
    Stake(StakeAccount),
    StakePool(StakePool),
    Execution(ExecutionRecord),
}

impl AccountRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Vault(_) => RecordKind::Vault,
            Self::Prompt(_) => RecordKind::Prompt,
            Self::Stake(_) => RecordKind::Stake,
            Self::StakePool(_) => RecordKind::StakePool,
            Self::Execution(_) => RecordKind::Execution,
        }
    }

    pub fn as_vault(&self) -> Option<&VaultState> {
        match self {
            Self::Vault(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_prompt(&self) -> Option<&PromptData> {
        match self {
            Self::Prompt(prompt) => Some(prompt),
            _ => None,
        }
    }

    pub fn as_stake(&self) -> Option<&StakeAccount> {
        match self {
            Self::Stake(stake) => Some(stake),
            _ => None,
        }
    }

    pub fn as_stake_pool(&self) -> Option<&StakePool> {
        match self {
            Self::StakePool(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn as_execution(&self) -> Option<&ExecutionRecord> {
        match self {
            Self::Execution(record) => Some(record),
            _ => None,
        }
    }
}

impl From<VaultState> for AccountRecord {
    fn from(value: VaultState) -> Self {
        Self::Vault(value)
    }
}

impl From<PromptData> for AccountRecord {
    fn from(value: PromptData) -> Self {
        Self::Prompt(value)
    }
}

impl From<StakeAccount> for AccountRecord {
    fn from(value: StakeAccount) -> Self {
        Self::Stake(value)
    }
}

impl From<StakePool> for AccountRecord {
    fn from(value: StakePool) -> Self {
        Self::StakePool(value)
    }
}

impl From<ExecutionRecord> for AccountRecord {
    fn from(value: ExecutionRecord) -> Self {
        Self::Execution(value)
    }
}
