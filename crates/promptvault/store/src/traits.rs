use promptvault_types::{Address, Identity};

use crate::error::{StoreError, TransferError};
use crate::record::AccountRecord;

/// Key-value persistence for typed records, addressed deterministically.
///
/// Backends must make each method atomic per record: `create_if_absent`
/// admits exactly one winner under concurrent creation, and `update` is an
/// exclusive read-modify-write so concurrent increments serialize.
pub trait AccountStore: Send + Sync {
    /// Create the record, failing with `AlreadyExists` if the address is
    /// occupied. Never overwrites.
    fn create_if_absent(&self, address: Address, record: AccountRecord) -> Result<(), StoreError>;

    fn fetch(&self, address: &Address) -> Result<Option<AccountRecord>, StoreError>;

    /// Replace an existing record; fails with `NotFound` if absent.
    fn write(&self, address: &Address, record: AccountRecord) -> Result<(), StoreError>;

    /// Atomic read-modify-write of an existing record. Returns the updated
    /// record; fails with `NotFound` if absent.
    fn update(
        &self,
        address: &Address,
        apply: &mut dyn FnMut(&mut AccountRecord),
    ) -> Result<AccountRecord, StoreError>;

    /// Remove an existing record; fails with `NotFound` if absent. Used to
    /// release a reservation whose payment leg did not settle.
    fn remove(&self, address: &Address) -> Result<(), StoreError>;

    fn exists(&self, address: &Address) -> Result<bool, StoreError>;
}

/// External balance-transfer contract consumed by staking and execution.
///
/// Each call is atomic; `transfer_split` moves both legs or neither, so a
/// fee split can never observably half-complete.
pub trait TokenLedger: Send + Sync {
    fn transfer(&self, from: &Identity, to: &Identity, amount: u64) -> Result<(), TransferError>;

    /// Two transfers from the same source as a single atomic unit.
    fn transfer_split(
        &self,
        from: &Identity,
        first: (&Identity, u64),
        second: (&Identity, u64),
    ) -> Result<(), TransferError>;
}
