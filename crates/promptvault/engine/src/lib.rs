//! PromptVault engine: vault administration, prompt registry, staking, and
//! execution recording over pluggable storage and token backends.
//!
//! The [`PromptVault`] facade wires the four components over a shared
//! [`AccountStore`] and [`TokenLedger`]. Embedders with their own backends
//! construct it through [`PromptVault::with_backends`]; tests and local use
//! go through [`PromptVault::in_memory`].

pub mod execution;
pub mod registry;
pub mod staking;
pub mod vault;

use std::sync::Arc;

use promptvault_store::{AccountStore, InMemoryAccountStore, InMemoryTokenLedger, TokenLedger};

pub use execution::{ExecutionRecorder, RecordExecution};
pub use registry::{PromptRegistry, RegisterPrompt};
pub use staking::StakingEngine;
pub use vault::VaultManager;

/// Facade bundling the vault components over shared backends.
pub struct PromptVault {
    vault: VaultManager,
    registry: PromptRegistry,
    staking: StakingEngine,
    executions: ExecutionRecorder,
}

impl PromptVault {
    /// Construct over caller-supplied storage and token backends.
    pub fn with_backends(store: Arc<dyn AccountStore>, tokens: Arc<dyn TokenLedger>) -> Self {
        let vault = VaultManager::new(Arc::clone(&store));
        let registry = PromptRegistry::new(Arc::clone(&store), vault.clone());
        let staking = StakingEngine::new(
            Arc::clone(&store),
            Arc::clone(&tokens),
            vault.clone(),
            registry.clone(),
        );
        let executions =
            ExecutionRecorder::new(store, tokens, vault.clone(), registry.clone());
        Self {
            vault,
            registry,
            staking,
            executions,
        }
    }

    /// Construct over fresh in-memory backends.
    pub fn in_memory() -> Self {
        Self::with_backends(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryTokenLedger::new()),
        )
    }

    pub fn vault(&self) -> &VaultManager {
        &self.vault
    }

    pub fn registry(&self) -> &PromptRegistry {
        &self.registry
    }

    pub fn staking(&self) -> &StakingEngine {
        &self.staking
    }

    pub fn executions(&self) -> &ExecutionRecorder {
        &self.executions
    }
}
