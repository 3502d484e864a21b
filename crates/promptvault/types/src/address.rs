use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::Identity;

/// Domain prefix for address derivation. Bumping the version re-keys every
/// derived address, so it changes only with a coordinated migration.
const ADDRESS_DOMAIN_V1: &[u8] = b"promptvault-address-v1:";

/// Namespace tags for the record families stored by the registry.
pub mod namespace {
    pub const VAULT_STATE: &str = "vault_state";
    pub const PROMPT: &str = "prompt";
    pub const STAKE: &str = "stake";
    pub const STAKE_POOL: &str = "stake_pool";
    pub const EXECUTION: &str = "execution";
}

/// A deterministic, collision-resistant record address.
///
/// Derived as a blake3 hash over a versioned domain prefix plus the
/// length-prefixed namespace tag and key parts. Identical inputs always
/// yield the identical address; there is no central allocator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Derive the address for `namespace_tag` and the ordered `key_parts`.
    pub fn derive(namespace_tag: &str, key_parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ADDRESS_DOMAIN_V1);
        hasher.update(&(namespace_tag.len() as u32).to_le_bytes());
        hasher.update(namespace_tag.as_bytes());
        for part in key_parts {
            hasher.update(&(part.len() as u32).to_le_bytes());
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Address of the global vault state singleton.
    pub fn vault_state() -> Self {
        Self::derive(namespace::VAULT_STATE, &[])
    }

    /// Address of the prompt record with the given id.
    pub fn prompt(prompt_id: &str) -> Self {
        Self::derive(namespace::PROMPT, &[prompt_id.as_bytes()])
    }

    /// Address of the stake record for a (prompt, staker) pair.
    pub fn stake(prompt_id: &str, staker: &Identity) -> Self {
        Self::derive(
            namespace::STAKE,
            &[prompt_id.as_bytes(), staker.as_str().as_bytes()],
        )
    }

    /// Address of the aggregate stake pool singleton.
    pub fn stake_pool() -> Self {
        Self::derive(namespace::STAKE_POOL, &[])
    }

    /// Address of the execution record with the given execution id.
    pub fn execution(execution_id: &str) -> Self {
        Self::derive(namespace::EXECUTION, &[execution_id.as_bytes()])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex form for logs.
    pub fn short(&self) -> String {
        self.0[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}
