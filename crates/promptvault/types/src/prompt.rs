use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::identity::Identity;

pub const MAX_PROMPT_ID_LEN: usize = 64;
pub const MAX_VERSION_LEN: usize = 32;
pub const MAX_CONTENT_URI_LEN: usize = 256;
pub const MAX_TAGS: usize = 5;

/// License terms attached to a prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseType {
    /// Free to execute by anyone.
    #[default]
    Public,
    /// Charges `price` per execution, split between author and vault.
    Paid,
    /// Restricted access; never charged, never forkable.
    Private,
}

/// Lifecycle status of a prompt record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptStatus {
    /// Available for execution, staking, and forking.
    #[default]
    Active,
    /// Still executable but no longer stakeable.
    Deprecated,
    /// Suspended due to violations; not accessible.
    Suspended,
    /// Permanently removed; not accessible.
    Removed,
}

/// One entry in a prompt's append-only version history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    pub content_uri: String,
    pub changelog: String,
    pub timestamp: DateTime<Utc>,
}

/// Rolling execution statistics kept on the prompt record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub total_executions: u64,
    pub total_revenue: u64,
    /// Rolling average execution time in milliseconds.
    pub avg_execution_time_ms: u32,
    /// Success rate in basis points (10000 = 100%).
    pub success_rate_bps: u16,
    pub last_execution: Option<DateTime<Utc>>,
}

impl ExecutionStats {
    /// Fold one execution into the rolling statistics.
    pub fn record(&mut self, execution_time_ms: u32, success: bool, revenue: u64) {
        let previous = self.total_executions;
        self.total_executions = previous.saturating_add(1);

        if success {
            self.total_revenue = self.total_revenue.saturating_add(revenue);
        }

        let total_time = u64::from(self.avg_execution_time_ms)
            .saturating_mul(previous)
            .saturating_add(u64::from(execution_time_ms));
        self.avg_execution_time_ms = (total_time / self.total_executions) as u32;

        let successes_before = u64::from(self.success_rate_bps).saturating_mul(previous) / 10_000;
        let successes = successes_before.saturating_add(u64::from(success));
        self.success_rate_bps =
            (successes.saturating_mul(10_000) / self.total_executions) as u16;
    }
}

/// A registered prompt record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptData {
    /// Caller-chosen unique key; uniqueness enforced by address collision.
    pub id: String,
    /// Identity that registered or forked this record.
    pub author: Identity,
    pub title: String,
    pub description: String,
    pub content_uri: String,
    pub tags: Vec<String>,
    pub license: LicenseType,
    /// Amount charged per execution when licensed as Paid.
    pub price: u64,
    pub status: PromptStatus,
    /// None until the first `create_version`.
    pub current_version: Option<String>,
    /// Append-only version history.
    pub versions: Vec<VersionEntry>,
    pub stats: ExecutionStats,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl PromptData {
    pub fn is_active(&self) -> bool {
        matches!(self.status, PromptStatus::Active)
    }

    /// Accessible prompts can be executed and forked.
    pub fn is_accessible(&self) -> bool {
        matches!(self.status, PromptStatus::Active | PromptStatus::Deprecated)
    }

    /// Append a version entry and advance the current version pointer.
    ///
    /// Rejects a version identical to the current one; no semantic ordering
    /// is enforced beyond that.
    pub fn add_version(&mut self, entry: VersionEntry) -> Result<(), VaultError> {
        if self.current_version.as_deref() == Some(entry.version.as_str()) {
            return Err(VaultError::DuplicateVersion(entry.version));
        }
        self.current_version = Some(entry.version.clone());
        self.content_uri = entry.content_uri.clone();
        self.last_updated = entry.timestamp;
        self.versions.push(entry);
        Ok(())
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }
}

/// Validate a caller-chosen prompt id: non-empty, bounded, and restricted
/// to alphanumerics, underscores, and hyphens.
pub fn validate_prompt_id(id: &str) -> Result<(), VaultError> {
    let well_formed = !id.is_empty()
        && id.len() <= MAX_PROMPT_ID_LEN
        && id.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(VaultError::InvalidPromptId(id.to_string()))
    }
}

pub fn validate_version(version: &str) -> Result<(), VaultError> {
    if version.is_empty() || version.len() > MAX_VERSION_LEN {
        return Err(VaultError::InvalidVersion(version.to_string()));
    }
    Ok(())
}

pub fn validate_content_uri(uri: &str) -> Result<(), VaultError> {
    if uri.len() > MAX_CONTENT_URI_LEN {
        return Err(VaultError::InvalidContentUri(uri.to_string()));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), VaultError> {
    if tags.len() > MAX_TAGS {
        return Err(VaultError::TooManyTags {
            got: tags.len(),
            max: MAX_TAGS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> PromptData {
        let now = Utc::now();
        PromptData {
            id: "p1".into(),
            author: Identity::new("alice"),
            title: "Test".into(),
            description: String::new(),
            content_uri: "ipfs://seed".into(),
            tags: vec![],
            license: LicenseType::Public,
            price: 0,
            status: PromptStatus::Active,
            current_version: None,
            versions: vec![],
            stats: ExecutionStats::default(),
            created_at: now,
            last_updated: now,
        }
    }

    fn entry(version: &str) -> VersionEntry {
        VersionEntry {
            version: version.into(),
            content_uri: format!("ipfs://{version}"),
            changelog: "changes".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn add_version_advances_pointer_and_history() {
        let mut prompt = prompt();
        prompt.add_version(entry("1.0.0")).unwrap();
        prompt.add_version(entry("1.1.0")).unwrap();

        assert_eq!(prompt.current_version.as_deref(), Some("1.1.0"));
        assert_eq!(prompt.content_uri, "ipfs://1.1.0");
        assert_eq!(prompt.versions.len(), 2);
    }

    #[test]
    fn add_version_rejects_current_version() {
        let mut prompt = prompt();
        prompt.add_version(entry("1.0.0")).unwrap();
        let err = prompt.add_version(entry("1.0.0")).unwrap_err();
        assert_eq!(err, VaultError::DuplicateVersion("1.0.0".into()));
    }

    #[test]
    fn add_version_allows_non_monotonic_strings() {
        let mut prompt = prompt();
        prompt.add_version(entry("2.0.0")).unwrap();
        prompt.add_version(entry("1.0.0")).unwrap();
        assert_eq!(prompt.current_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn prompt_id_validation() {
        assert!(validate_prompt_id("my_prompt-v1").is_ok());
        assert!(validate_prompt_id("").is_err());
        assert!(validate_prompt_id("has space").is_err());
        assert!(validate_prompt_id(&"x".repeat(MAX_PROMPT_ID_LEN + 1)).is_err());
    }

    #[test]
    fn stats_average_and_success_rate() {
        let mut stats = ExecutionStats::default();
        stats.record(100, true, 10);
        stats.record(300, false, 10);

        assert_eq!(stats.total_executions, 2);
        assert_eq!(stats.total_revenue, 10);
        assert_eq!(stats.avg_execution_time_ms, 200);
        assert_eq!(stats.success_rate_bps, 5_000);
    }

    #[test]
    fn stats_survive_extreme_counts() {
        let mut stats = ExecutionStats {
            total_executions: u64::MAX - 1,
            avg_execution_time_ms: u32::MAX,
            success_rate_bps: 10_000,
            ..Default::default()
        };
        stats.record(u32::MAX, true, u64::MAX);
        assert_eq!(stats.total_executions, u64::MAX);
        assert!(stats.success_rate_bps <= 10_000);
    }

    #[test]
    fn suspended_prompt_is_not_accessible() {
        let mut prompt = prompt();
        prompt.status = PromptStatus::Suspended;
        assert!(!prompt.is_accessible());
        prompt.status = PromptStatus::Deprecated;
        assert!(prompt.is_accessible());
        assert!(!prompt.is_active());
    }
}
