use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::identity::Identity;

/// Per-(prompt, staker) stake record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeAccount {
    pub owner: Identity,
    pub prompt_id: String,
    pub staked_amount: u64,
    pub staked_at: DateTime<Utc>,
}

impl StakeAccount {
    pub fn new(owner: Identity, prompt_id: String, initial_stake: u64, now: DateTime<Utc>) -> Self {
        Self {
            owner,
            prompt_id,
            staked_amount: initial_stake,
            staked_at: now,
        }
    }

    pub fn add_stake(&mut self, amount: u64) {
        self.staked_amount = self.staked_amount.saturating_add(amount);
    }

    pub fn remove_stake(&mut self, amount: u64) -> Result<(), VaultError> {
        if amount > self.staked_amount {
            return Err(VaultError::InsufficientStake {
                requested: amount,
                staked: self.staked_amount,
            });
        }
        self.staked_amount -= amount;
        Ok(())
    }
}

/// Aggregate stake counter used for ranking weight.
///
/// Invariant: `total_staked` equals the sum of every stake account's
/// `staked_amount`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePool {
    pub total_staked: u64,
}

impl StakePool {
    pub fn deposit(&mut self, amount: u64) {
        self.total_staked = self.total_staked.saturating_add(amount);
    }

    pub fn withdraw(&mut self, amount: u64) {
        self.total_staked = self.total_staked.saturating_sub(amount);
    }
}
