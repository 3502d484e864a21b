use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Immutable receipt for one prompt execution.
///
/// Created exactly once by the execution recorder; duplicate execution ids
/// are rejected by address collision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub execution_id: String,
    pub prompt_id: String,
    pub caller: Identity,
    pub success: bool,
    pub execution_time_ms: u32,
    /// Opaque attestation bytes supplied by the caller.
    pub signature: Vec<u8>,
    /// Price charged for this execution; zero for non-Paid licenses.
    pub fee_paid: u64,
    pub timestamp: DateTime<Utc>,
}
