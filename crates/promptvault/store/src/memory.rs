use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use promptvault_types::{Address, Identity};

use crate::error::{StoreError, TransferError};
use crate::record::AccountRecord;
use crate::traits::{AccountStore, TokenLedger};

/// In-memory account store used for tests, local demos, and embedding.
#[derive(Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<HashMap<Address, AccountRecord>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountStore for InMemoryAccountStore {
    fn create_if_absent(&self, address: Address, record: AccountRecord) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        if map.contains_key(&address) {
            return Err(StoreError::AlreadyExists(address));
        }
        debug!(address = %address.short(), kind = ?record.kind(), "record created");
        map.insert(address, record);
        Ok(())
    }

    fn fetch(&self, address: &Address) -> Result<Option<AccountRecord>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(address).cloned())
    }

    fn write(&self, address: &Address, record: AccountRecord) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let slot = map
            .get_mut(address)
            .ok_or(StoreError::NotFound(*address))?;
        *slot = record;
        Ok(())
    }

    fn update(
        &self,
        address: &Address,
        apply: &mut dyn FnMut(&mut AccountRecord),
    ) -> Result<AccountRecord, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let slot = map
            .get_mut(address)
            .ok_or(StoreError::NotFound(*address))?;
        apply(slot);
        Ok(slot.clone())
    }

    fn remove(&self, address: &Address) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        map.remove(address).ok_or(StoreError::NotFound(*address))?;
        debug!(address = %address.short(), "record removed");
        Ok(())
    }

    fn exists(&self, address: &Address) -> Result<bool, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.contains_key(address))
    }
}

/// In-memory token ledger for tests and local embedding.
///
/// Balances start at zero; `credit` funds an account out of thin air and is
/// intended for test setup only.
#[derive(Default)]
pub struct InMemoryTokenLedger {
    balances: RwLock<HashMap<Identity, u64>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&self, account: &Identity, amount: u64) {
        if let Ok(mut balances) = self.balances.write() {
            let balance = balances.entry(account.clone()).or_insert(0);
            *balance = balance.saturating_add(amount);
        }
    }

    pub fn balance_of(&self, account: &Identity) -> u64 {
        self.balances
            .read()
            .ok()
            .and_then(|balances| balances.get(account).copied())
            .unwrap_or(0)
    }

    fn debit_checked(
        balances: &mut HashMap<Identity, u64>,
        from: &Identity,
        amount: u64,
    ) -> Result<(), TransferError> {
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                account: from.clone(),
                requested: amount,
                available,
            });
        }
        balances.insert(from.clone(), available - amount);
        Ok(())
    }

    fn credit_unchecked(balances: &mut HashMap<Identity, u64>, to: &Identity, amount: u64) {
        let balance = balances.entry(to.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn transfer(&self, from: &Identity, to: &Identity, amount: u64) -> Result<(), TransferError> {
        let mut balances = self
            .balances
            .write()
            .map_err(|_| TransferError::InsufficientFunds {
                account: from.clone(),
                requested: amount,
                available: 0,
            })?;
        Self::debit_checked(&mut balances, from, amount)?;
        Self::credit_unchecked(&mut balances, to, amount);
        debug!(%from, %to, amount, "transfer");
        Ok(())
    }

    fn transfer_split(
        &self,
        from: &Identity,
        first: (&Identity, u64),
        second: (&Identity, u64),
    ) -> Result<(), TransferError> {
        let total = first
            .1
            .checked_add(second.1)
            .ok_or(TransferError::Overflow)?;

        let mut balances = self
            .balances
            .write()
            .map_err(|_| TransferError::InsufficientFunds {
                account: from.clone(),
                requested: total,
                available: 0,
            })?;

        // Validated against the combined amount before either leg applies,
        // so the split commits both legs or neither.
        Self::debit_checked(&mut balances, from, total)?;
        Self::credit_unchecked(&mut balances, first.0, first.1);
        Self::credit_unchecked(&mut balances, second.0, second.1);
        debug!(%from, first_to = %first.0, first_amount = first.1, second_to = %second.0, second_amount = second.1, "split transfer");
        Ok(())
    }
}
