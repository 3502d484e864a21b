use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use promptvault_store::{AccountRecord, AccountStore, StoreError};
use promptvault_types::{Address, Identity, VaultError, VaultState};

/// Owner of the global vault configuration and the pause circuit breaker.
///
/// Every other component consults [`VaultManager::assert_not_paused`]
/// before mutating anything; pause and resume themselves are the only
/// mutations allowed while paused.
#[derive(Clone)]
pub struct VaultManager {
    store: Arc<dyn AccountStore>,
}

impl VaultManager {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Create the vault singleton. Fails with `AlreadyInitialized` on any
    /// second call and with `InvalidFee` for fees above 10000 bps.
    pub fn initialize(
        &self,
        admin: Identity,
        fee_bps: u16,
        min_stake_amount: u64,
    ) -> Result<VaultState, VaultError> {
        let state = VaultState::new(admin, fee_bps, min_stake_amount, Utc::now())?;
        self.store
            .create_if_absent(Address::vault_state(), state.clone().into())
            .map_err(|err| match err {
                StoreError::AlreadyExists(_) => VaultError::AlreadyInitialized,
                other => other.into(),
            })?;

        info!(admin = %state.admin, fee_bps, min_stake_amount, "vault initialized");
        Ok(state)
    }

    /// Read the vault state; `NotInitialized` before `initialize`.
    pub fn state(&self) -> Result<VaultState, VaultError> {
        let record = self
            .store
            .fetch(&Address::vault_state())?
            .ok_or(VaultError::NotInitialized)?;
        vault_of(record)
    }

    /// Gate check consumed by every mutating operation outside this
    /// component. Returns the state so callers can reuse fee and minimum
    /// stake without a second read.
    pub fn assert_not_paused(&self) -> Result<VaultState, VaultError> {
        let state = self.state()?;
        if state.is_paused {
            return Err(VaultError::VaultPaused);
        }
        Ok(state)
    }

    /// Admin-only circuit breaker. Idempotent: pausing an already-paused
    /// vault rewrites the flag and touches the timestamp.
    pub fn emergency_pause(&self, caller: &Identity) -> Result<VaultState, VaultError> {
        let state = self.set_paused(caller, true)?;
        info!(admin = %caller, "emergency pause activated");
        Ok(state)
    }

    /// Admin-only resume; allowed (and meaningful) only while paused, but
    /// idempotent on an already-active vault.
    pub fn resume_operations(&self, caller: &Identity) -> Result<VaultState, VaultError> {
        let state = self.set_paused(caller, false)?;
        info!(admin = %caller, "operations resumed");
        Ok(state)
    }

    /// Bump the registered-prompt counter; called by the registry after a
    /// successful registration or fork.
    pub(crate) fn increment_prompt_count(&self) -> Result<(), VaultError> {
        self.store
            .update(&Address::vault_state(), &mut |record| {
                if let AccountRecord::Vault(vault) = record {
                    vault.increment_prompt_count(Utc::now());
                }
            })
            .map_err(|err| match err {
                StoreError::NotFound(_) => VaultError::NotInitialized,
                other => other.into(),
            })?;
        Ok(())
    }

    fn set_paused(&self, caller: &Identity, paused: bool) -> Result<VaultState, VaultError> {
        let state = self.state()?;
        if &state.admin != caller {
            return Err(VaultError::Unauthorized(
                "only the vault admin may pause or resume operations".into(),
            ));
        }

        let updated = self.store.update(&Address::vault_state(), &mut |record| {
            if let AccountRecord::Vault(vault) = record {
                vault.is_paused = paused;
                vault.touch(Utc::now());
            }
        })?;
        vault_of(updated)
    }
}

fn vault_of(record: AccountRecord) -> Result<VaultState, VaultError> {
    match record {
        AccountRecord::Vault(state) => Ok(state),
        other => Err(VaultError::Store(format!(
            "vault_state address holds a {:?} record",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptvault_store::InMemoryAccountStore;

    fn manager() -> VaultManager {
        VaultManager::new(Arc::new(InMemoryAccountStore::new()))
    }

    #[test]
    fn initialize_succeeds_exactly_once() {
        let vault = manager();
        vault
            .initialize(Identity::new("admin"), 1_000, 1_000_000)
            .unwrap();
        let err = vault
            .initialize(Identity::new("other"), 0, 0)
            .unwrap_err();
        assert_eq!(err, VaultError::AlreadyInitialized);
    }

    #[test]
    fn initialize_rejects_fee_above_ceiling() {
        let vault = manager();
        let err = vault
            .initialize(Identity::new("admin"), 10_001, 0)
            .unwrap_err();
        assert_eq!(err, VaultError::InvalidFee { fee_bps: 10_001 });
        assert_eq!(vault.state().unwrap_err(), VaultError::NotInitialized);
    }

    #[test]
    fn pause_requires_admin() {
        let vault = manager();
        let admin = Identity::new("admin");
        vault.initialize(admin.clone(), 0, 0).unwrap();

        let outsider = Identity::new("outsider");
        assert!(matches!(
            vault.emergency_pause(&outsider),
            Err(VaultError::Unauthorized(_))
        ));
        assert!(matches!(
            vault.resume_operations(&outsider),
            Err(VaultError::Unauthorized(_))
        ));

        vault.emergency_pause(&admin).unwrap();
        assert_eq!(
            vault.assert_not_paused().unwrap_err(),
            VaultError::VaultPaused
        );
        vault.resume_operations(&admin).unwrap();
        assert!(vault.assert_not_paused().is_ok());
    }

    #[test]
    fn pause_is_idempotent() {
        let vault = manager();
        let admin = Identity::new("admin");
        vault.initialize(admin.clone(), 0, 0).unwrap();

        vault.emergency_pause(&admin).unwrap();
        let state = vault.emergency_pause(&admin).unwrap();
        assert!(state.is_paused);

        vault.resume_operations(&admin).unwrap();
        let state = vault.resume_operations(&admin).unwrap();
        assert!(!state.is_paused);
    }

    #[test]
    fn gate_reports_not_initialized_before_init() {
        let vault = manager();
        assert_eq!(
            vault.assert_not_paused().unwrap_err(),
            VaultError::NotInitialized
        );
    }
}
