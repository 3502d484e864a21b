use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use promptvault_store::{AccountRecord, AccountStore, StoreError, TokenLedger};
use promptvault_types::{Address, ExecutionRecord, Identity, LicenseType, VaultError};

use crate::registry::PromptRegistry;
use crate::vault::VaultManager;

/// Custody account receiving the vault's cut of paid executions.
fn treasury_custody() -> Identity {
    Identity::custody("vault_treasury")
}

/// Parameters for [`ExecutionRecorder::record_execution`].
#[derive(Clone, Debug)]
pub struct RecordExecution {
    /// Caller-chosen unique id; a repeat id is rejected before any payment.
    pub execution_id: String,
    pub prompt_id: String,
    pub success: bool,
    pub execution_time_ms: u32,
    /// Opaque attestation bytes supplied by the executor.
    pub signature: Vec<u8>,
}

/// Pay-per-execution recording: charges the license fee, splits it between
/// author and treasury, and folds the outcome into the prompt statistics.
#[derive(Clone)]
pub struct ExecutionRecorder {
    store: Arc<dyn AccountStore>,
    tokens: Arc<dyn TokenLedger>,
    vault: VaultManager,
    registry: PromptRegistry,
}

impl ExecutionRecorder {
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

    /// Record one execution of an accessible prompt.
    ///
    /// For a Paid license the caller is charged the prompt's price in a
    /// single atomic split: `price * fee_bps / 10000` to the treasury and
    /// the remainder to the author. The duplicate-id check runs before the
    /// charge, so a replayed id never moves funds twice.
    pub fn record_execution(
        &self,
        caller: &Identity,
        request: RecordExecution,
    ) -> Result<ExecutionRecord, VaultError> {
        let state = self.vault.assert_not_paused()?;

        let prompt = self.registry.load_prompt(&request.prompt_id)?;
        if !prompt.is_accessible() {
            return Err(VaultError::PromptNotAccessible(prompt.status));
        }

        let charges = (prompt.license == LicenseType::Paid && prompt.price > 0)
            .then(|| state.split_fee(prompt.price));
        let fee_paid = if charges.is_some() { prompt.price } else { 0 };

        // Creating the record reserves the id before any funds move, so of
        // two concurrent replays exactly one can reach the payment leg.
        let address = Address::execution(&request.execution_id);
        let record = ExecutionRecord {
            execution_id: request.execution_id.clone(),
            prompt_id: request.prompt_id.clone(),
            caller: caller.clone(),
            success: request.success,
            execution_time_ms: request.execution_time_ms,
            signature: request.signature,
            fee_paid,
            timestamp: Utc::now(),
        };
        self.store
            .create_if_absent(address, record.clone().into())
            .map_err(|err| match err {
                StoreError::AlreadyExists(_) => {
                    VaultError::DuplicateExecutionId(request.execution_id)
                }
                other => other.into(),
            })?;

        if let Some((fee, author_share)) = charges {
            if let Err(err) = self.tokens.transfer_split(
                caller,
                (&treasury_custody(), fee),
                (&prompt.author, author_share),
            ) {
                // A failed charge releases the reservation.
                self.store.remove(&address)?;
                return Err(err.into());
            }
        }

        self.store
            .update(&Address::prompt(&request.prompt_id), &mut |slot| {
                if let AccountRecord::Prompt(prompt) = slot {
                    prompt
                        .stats
                        .record(record.execution_time_ms, record.success, fee_paid);
                    prompt.stats.last_execution = Some(record.timestamp);
                }
            })?;

        info!(
            execution = %record.execution_id,
            prompt = %record.prompt_id,
            caller = %caller,
            success = record.success,
            fee_paid,
            "execution recorded"
        );
        Ok(record)
    }

    /// Read an execution record, if any.
    pub fn get_execution(
        &self,
        execution_id: &str,
    ) -> Result<Option<ExecutionRecord>, VaultError> {
        match self.store.fetch(&Address::execution(execution_id))? {
            Some(AccountRecord::Execution(record)) => Ok(Some(record)),
            Some(other) => Err(VaultError::Store(format!(
                "execution address holds a {:?} record",
                other.kind()
            ))),
            None => Ok(None),
        }
    }
}
