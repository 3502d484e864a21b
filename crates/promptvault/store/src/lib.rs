//! Substrate boundaries for PromptVault.
//!
//! This crate provides:
//! - the `AccountStore` trait: typed records keyed by deterministic
//!   addresses, with atomic create-if-absent and read-modify-write
//! - the `TokenLedger` trait: the external balance-transfer contract,
//!   including the atomic two-leg split used for fee payments
//! - in-memory implementations of both for tests, demos, and embedding

pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::{StoreError, TransferError};
pub use memory::{InMemoryAccountStore, InMemoryTokenLedger};
pub use record::{AccountRecord, RecordKind};
pub use traits::{AccountStore, TokenLedger};
