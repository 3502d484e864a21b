use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use promptvault_store::{AccountRecord, AccountStore, StoreError, TokenLedger};
use promptvault_types::{Address, Identity, StakeAccount, StakePool, VaultError};

use crate::registry::PromptRegistry;
use crate::vault::VaultManager;

/// Custody account holding all staked tokens until they are unstaked.
fn pool_custody() -> Identity {
    Identity::custody("stake_pool")
}

/// Stake-based ranking weight: deposits into per-(prompt, staker) accounts
/// plus a global aggregate pool.
#[derive(Clone)]
pub struct StakingEngine {
    store: Arc<dyn AccountStore>,
    tokens: Arc<dyn TokenLedger>,
    vault: VaultManager,
    registry: PromptRegistry,
}

impl StakingEngine {
    pub fn new(
        store: Arc<dyn AccountStore>,
        tokens: Arc<dyn TokenLedger>,
        vault: VaultManager,
        registry: PromptRegistry,
    ) -> Self {
        Self {
            store,
            tokens,
            vault,
            registry,
        }
    }

    /// Stake tokens on an active prompt. Repeated stakes by the same caller
    /// accumulate into one account; each call must individually meet the
    /// vault minimum. Tokens move into pool custody before any record is
    /// touched, so a failed transfer leaves no stake.
    pub fn stake_for_ranking(
        &self,
        caller: &Identity,
        prompt_id: &str,
        amount: u64,
    ) -> Result<StakeAccount, VaultError> {
        let state = self.vault.assert_not_paused()?;

        let prompt = self.registry.load_prompt(prompt_id)?;
        if !prompt.is_active() {
            return Err(VaultError::PromptNotActive(prompt.status));
        }
        if amount < state.min_stake_amount {
            return Err(VaultError::BelowMinimum {
                amount,
                minimum: state.min_stake_amount,
            });
        }

        self.tokens.transfer(caller, &pool_custody(), amount)?;

        let now = Utc::now();
        let address = Address::stake(prompt_id, caller);
        let fresh = StakeAccount::new(caller.clone(), prompt_id.to_string(), amount, now);
        let account = match self.store.create_if_absent(address, fresh.clone().into()) {
            Ok(()) => fresh,
            // Lost the creation race or the account already existed:
            // fold this stake into the existing record.
            Err(StoreError::AlreadyExists(_)) => {
                let updated = self.store.update(&address, &mut |record| {
                    if let AccountRecord::Stake(stake) = record {
                        stake.add_stake(amount);
                    }
                })?;
                stake_of(updated)?
            }
            Err(other) => return Err(other.into()),
        };
        self.deposit_into_pool(amount)?;

        info!(prompt = %prompt_id, staker = %caller, amount, total = account.staked_amount, "stake added");
        Ok(account)
    }

    /// Withdraw part or all of a stake back to the caller. The decrement
    /// commits atomically against the recorded amount, so concurrent
    /// withdrawals serialize and an overdraw has no effect; a failed payout
    /// restores the records.
    pub fn unstake(
        &self,
        caller: &Identity,
        prompt_id: &str,
        amount: u64,
    ) -> Result<StakeAccount, VaultError> {
        self.vault.assert_not_paused()?;
        if amount == 0 {
            return Err(VaultError::BelowMinimum {
                amount: 0,
                minimum: 1,
            });
        }

        let address = Address::stake(prompt_id, caller);
        // Validation and decrement happen inside one exclusive pass, so
        // concurrent withdrawals serialize against the recorded amount and
        // an overdraw attempt commits nothing.
        let mut overdraw: Option<VaultError> = None;
        let updated = self
            .store
            .update(&address, &mut |record| {
                if let AccountRecord::Stake(stake) = record {
                    if let Err(err) = stake.remove_stake(amount) {
                        overdraw = Some(err);
                    }
                }
            })
            .map_err(|err| match err {
                StoreError::NotFound(_) => VaultError::NotFound(format!("stake on {prompt_id}")),
                other => other.into(),
            })?;
        if let Some(err) = overdraw {
            return Err(err);
        }
        let account = stake_of(updated)?;

        self.store.update(&Address::stake_pool(), &mut |record| {
            if let AccountRecord::StakePool(pool) = record {
                pool.withdraw(amount);
            }
        })?;

        if let Err(err) = self.tokens.transfer(&pool_custody(), caller, amount) {
            // A failed payout restores both records.
            self.store.update(&address, &mut |record| {
                if let AccountRecord::Stake(stake) = record {
                    stake.add_stake(amount);
                }
            })?;
            self.store.update(&Address::stake_pool(), &mut |record| {
                if let AccountRecord::StakePool(pool) = record {
                    pool.deposit(amount);
                }
            })?;
            return Err(err.into());
        }

        info!(prompt = %prompt_id, staker = %caller, amount, remaining = account.staked_amount, "stake withdrawn");
        Ok(account)
    }

    /// Read the stake account for a (prompt, staker) pair, if any.
    pub fn get_stake(
        &self,
        prompt_id: &str,
        staker: &Identity,
    ) -> Result<Option<StakeAccount>, VaultError> {
        match self.store.fetch(&Address::stake(prompt_id, staker))? {
            Some(record) => Ok(Some(stake_of(record)?)),
            None => Ok(None),
        }
    }

    /// Aggregate amount currently staked across all prompts. Zero before
    /// the first stake.
    pub fn pool_total(&self) -> Result<u64, VaultError> {
        match self.store.fetch(&Address::stake_pool())? {
            Some(AccountRecord::StakePool(pool)) => Ok(pool.total_staked),
            Some(other) => Err(VaultError::Store(format!(
                "stake_pool address holds a {:?} record",
                other.kind()
            ))),
            None => Ok(0),
        }
    }

    fn deposit_into_pool(&self, amount: u64) -> Result<(), VaultError> {
        // The pool singleton is created lazily on first stake; a concurrent
        // creation race is benign since both land on the same update path.
        if let Err(err) = self
            .store
            .create_if_absent(Address::stake_pool(), StakePool::default().into())
        {
            if !matches!(err, StoreError::AlreadyExists(_)) {
                return Err(err.into());
            }
        }
        self.store.update(&Address::stake_pool(), &mut |record| {
            if let AccountRecord::StakePool(pool) = record {
                pool.deposit(amount);
            }
        })?;
        Ok(())
    }
}

fn stake_of(record: AccountRecord) -> Result<StakeAccount, VaultError> {
    match record {
        AccountRecord::Stake(stake) => Ok(stake),
        other => Err(VaultError::Store(format!(
            "stake address holds a {:?} record",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptvault_store::{InMemoryAccountStore, InMemoryTokenLedger};
    use promptvault_types::{LicenseType, PromptStatus};

    use crate::registry::RegisterPrompt;

    struct Fixture {
        staking: StakingEngine,
        registry: PromptRegistry,
        ledger: Arc<InMemoryTokenLedger>,
        admin: Identity,
    }

    fn fixture(min_stake: u64) -> Fixture {
        let store: Arc<dyn AccountStore> = Arc::new(InMemoryAccountStore::new());
        let ledger = Arc::new(InMemoryTokenLedger::new());
        let tokens: Arc<dyn TokenLedger> = Arc::clone(&ledger) as Arc<dyn TokenLedger>;
        let vault = VaultManager::new(Arc::clone(&store));
        let admin = Identity::new("admin");
        vault.initialize(admin.clone(), 1_000, min_stake).unwrap();
        let registry = PromptRegistry::new(Arc::clone(&store), vault.clone());
        let staking = StakingEngine::new(store, tokens, vault, registry.clone());
        Fixture {
            staking,
            registry,
            ledger,
            admin,
        }
    }

    fn register(fixture: &Fixture, id: &str) -> Identity {
        let author = Identity::new("author");
        fixture
            .registry
            .register_prompt(
                &author,
                RegisterPrompt {
                    id: id.into(),
                    title: "t".into(),
                    description: String::new(),
                    content_uri: "ipfs://x".into(),
                    tags: vec![],
                    license: LicenseType::Public,
                    price: 0,
                },
            )
            .unwrap();
        author
    }

    #[test]
    fn stakes_accumulate_across_calls() {
        let fixture = fixture(100);
        register(&fixture, "p1");
        let staker = Identity::new("staker");
        fixture.ledger.credit(&staker, 1_000);

        fixture.staking.stake_for_ranking(&staker, "p1", 300).unwrap();
        let account = fixture.staking.stake_for_ranking(&staker, "p1", 200).unwrap();

        assert_eq!(account.staked_amount, 500);
        assert_eq!(fixture.staking.pool_total().unwrap(), 500);
        assert_eq!(fixture.ledger.balance_of(&staker), 500);
    }

    #[test]
    fn each_stake_must_meet_minimum() {
        let fixture = fixture(100);
        register(&fixture, "p1");
        let staker = Identity::new("staker");
        fixture.ledger.credit(&staker, 1_000);

        let err = fixture
            .staking
            .stake_for_ranking(&staker, "p1", 99)
            .unwrap_err();
        assert_eq!(
            err,
            VaultError::BelowMinimum {
                amount: 99,
                minimum: 100,
            }
        );
        assert_eq!(fixture.staking.pool_total().unwrap(), 0);
    }

    #[test]
    fn stake_requires_active_prompt() {
        let fixture = fixture(1);
        let author = register(&fixture, "p1");
        fixture
            .registry
            .update_status(&author, "p1", PromptStatus::Deprecated)
            .unwrap();

        let staker = Identity::new("staker");
        fixture.ledger.credit(&staker, 100);
        let err = fixture
            .staking
            .stake_for_ranking(&staker, "p1", 50)
            .unwrap_err();
        assert_eq!(err, VaultError::PromptNotActive(PromptStatus::Deprecated));
    }

    #[test]
    fn failed_transfer_leaves_no_stake() {
        let fixture = fixture(1);
        register(&fixture, "p1");
        let broke = Identity::new("broke");

        let err = fixture
            .staking
            .stake_for_ranking(&broke, "p1", 50)
            .unwrap_err();
        assert!(matches!(err, VaultError::TransferFailed(_)));
        assert_eq!(fixture.staking.get_stake("p1", &broke).unwrap(), None);
        assert_eq!(fixture.staking.pool_total().unwrap(), 0);
    }

    #[test]
    fn unstake_returns_tokens_and_shrinks_pool() {
        let fixture = fixture(1);
        register(&fixture, "p1");
        let staker = Identity::new("staker");
        fixture.ledger.credit(&staker, 500);
        fixture.staking.stake_for_ranking(&staker, "p1", 500).unwrap();

        let account = fixture.staking.unstake(&staker, "p1", 200).unwrap();
        assert_eq!(account.staked_amount, 300);
        assert_eq!(fixture.staking.pool_total().unwrap(), 300);
        assert_eq!(fixture.ledger.balance_of(&staker), 200);
    }

    #[test]
    fn unstake_rejects_overdraw_without_effect() {
        let fixture = fixture(1);
        register(&fixture, "p1");
        let staker = Identity::new("staker");
        fixture.ledger.credit(&staker, 100);
        fixture.staking.stake_for_ranking(&staker, "p1", 100).unwrap();

        let err = fixture.staking.unstake(&staker, "p1", 101).unwrap_err();
        assert_eq!(
            err,
            VaultError::InsufficientStake {
                requested: 101,
                staked: 100,
            }
        );
        assert_eq!(fixture.staking.pool_total().unwrap(), 100);
        assert_eq!(fixture.ledger.balance_of(&staker), 0);
    }

    #[test]
    fn staking_is_gated_by_pause() {
        let fixture = fixture(1);
        register(&fixture, "p1");
        let staker = Identity::new("staker");
        fixture.ledger.credit(&staker, 100);
        fixture
            .staking
            .vault
            .emergency_pause(&fixture.admin)
            .unwrap();

        assert_eq!(
            fixture
                .staking
                .stake_for_ranking(&staker, "p1", 50)
                .unwrap_err(),
            VaultError::VaultPaused
        );
        assert_eq!(
            fixture.staking.unstake(&staker, "p1", 50).unwrap_err(),
            VaultError::VaultPaused
        );
    }

    #[test]
    fn stakes_by_different_stakers_stay_separate() {
        let fixture = fixture(1);
        register(&fixture, "p1");
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");
        fixture.ledger.credit(&alice, 100);
        fixture.ledger.credit(&bob, 100);

        fixture.staking.stake_for_ranking(&alice, "p1", 60).unwrap();
        fixture.staking.stake_for_ranking(&bob, "p1", 40).unwrap();

        assert_eq!(
            fixture
                .staking
                .get_stake("p1", &alice)
                .unwrap()
                .map(|s| s.staked_amount),
            Some(60)
        );
        assert_eq!(
            fixture
                .staking
                .get_stake("p1", &bob)
                .unwrap()
                .map(|s| s.staked_amount),
            Some(40)
        );
        assert_eq!(fixture.staking.pool_total().unwrap(), 100);
    }
}
