use thiserror::Error;

use crate::prompt::PromptStatus;

/// Errors surfaced by the registry, staking, and execution components.
///
/// Every error is terminal for the attempted operation: no partial state is
/// committed, nothing is recovered internally, and callers see the failure
/// verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("vault state already initialized")]
    AlreadyInitialized,

    #[error("vault state not initialized")]
    NotInitialized,

    #[error("invalid fee: {fee_bps} bps exceeds the 10000 bps ceiling")]
    InvalidFee { fee_bps: u16 },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("vault is paused")]
    VaultPaused,

    #[error("prompt already exists: {0}")]
    DuplicateId(String),

    #[error("version {0} is already the current version")]
    DuplicateVersion(String),

    #[error("execution record already exists: {0}")]
    DuplicateExecutionId(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("stake amount {amount} is below the minimum {minimum}")]
    BelowMinimum { amount: u64, minimum: u64 },

    #[error("insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: u64, staked: u64 },

    #[error("token transfer failed: {0}")]
    TransferFailed(String),

    #[error("invalid prompt id: {0}")]
    InvalidPromptId(String),

    #[error("invalid version string: {0}")]
    InvalidVersion(String),

    #[error("invalid content uri: {0}")]
    InvalidContentUri(String),

    #[error("too many tags: {got} exceeds the maximum of {max}")]
    TooManyTags { got: usize, max: usize },

    #[error("forking is not allowed for private prompts")]
    ForkNotAllowed,

    #[error("cannot fork own prompt")]
    CannotForkOwnPrompt,

    #[error("prompt is not active: status {0:?}")]
    PromptNotActive(PromptStatus),

    #[error("prompt is not accessible: status {0:?}")]
    PromptNotAccessible(PromptStatus),

    #[error("store fault: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_context() {
        let err = VaultError::BelowMinimum {
            amount: 5,
            minimum: 100,
        };
        let rendered = err.to_string();
        assert!(rendered.contains('5'));
        assert!(rendered.contains("100"));
    }

    #[test]
    fn unauthorized_names_the_check() {
        let err = VaultError::Unauthorized("only the prompt author may create versions".into());
        assert!(err.to_string().contains("author"));
    }
}
