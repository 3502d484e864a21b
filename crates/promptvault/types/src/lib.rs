//! Core type definitions for PromptVault.
//!
//! This crate provides the canonical record types stored by the registry,
//! deterministic address derivation, caller identities, and the error
//! taxonomy shared by every component.

pub mod address;
pub mod error;
pub mod execution;
pub mod identity;
pub mod prompt;
pub mod stake;
pub mod vault;

// Re-export primary types at crate root for ergonomic use.
pub use address::Address;
pub use error::VaultError;
pub use execution::ExecutionRecord;
pub use identity::Identity;
pub use prompt::{
    validate_content_uri, validate_prompt_id, validate_tags, validate_version, ExecutionStats,
    LicenseType, PromptData, PromptStatus, VersionEntry, MAX_CONTENT_URI_LEN, MAX_PROMPT_ID_LEN,
    MAX_TAGS, MAX_VERSION_LEN,
};
pub use stake::{StakeAccount, StakePool};
pub use vault::{VaultState, FEE_DENOMINATOR_BPS};
