use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::identity::Identity;

/// Fee denominator: 10000 basis points = 100%.
pub const FEE_DENOMINATOR_BPS: u16 = 10_000;

/// Global vault configuration singleton.
///
/// Created exactly once by `initialize`, mutated only by the pause/resume
/// transitions and the prompt counter, never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    /// Admin authority with exclusive pause/resume rights.
    pub admin: Identity,
    /// Basis points taken from each paid execution.
    pub fee_bps: u16,
    /// Minimum stake accepted by the staking engine.
    pub min_stake_amount: u64,
    /// Circuit breaker; gates all prompt-mutating and staking operations.
    pub is_paused: bool,
    /// Total number of registered prompts (registrations plus forks).
    pub prompt_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl VaultState {
    /// Build the initial vault state, rejecting fees above 100%.
    pub fn new(
        admin: Identity,
        fee_bps: u16,
        min_stake_amount: u64,
        now: DateTime<Utc>,
    ) -> Result<Self, VaultError> {
        if fee_bps > FEE_DENOMINATOR_BPS {
            return Err(VaultError::InvalidFee { fee_bps });
        }
        Ok(Self {
            admin,
            fee_bps,
            min_stake_amount,
            is_paused: false,
            prompt_count: 0,
            created_at: now,
            last_updated: now,
        })
    }

    pub fn is_operational(&self) -> bool {
        !self.is_paused
    }

    /// Split a paid execution price into (protocol fee, author share).
    ///
    /// The fee rounds down; the author share absorbs the remainder so the
    /// two legs always sum to the price exactly.
    pub fn split_fee(&self, price: u64) -> (u64, u64) {
        let fee = (u128::from(price) * u128::from(self.fee_bps)
            / u128::from(FEE_DENOMINATOR_BPS)) as u64;
        (fee, price - fee)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }

    pub fn increment_prompt_count(&mut self, now: DateTime<Utc>) {
        self.prompt_count = self.prompt_count.saturating_add(1);
        self.touch(now);
    }
}
