use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use promptvault_store::{AccountRecord, AccountStore, StoreError};
use promptvault_types::{
    validate_content_uri, validate_prompt_id, validate_tags, validate_version, Address,
    ExecutionStats, Identity, LicenseType, PromptData, PromptStatus, VaultError, VersionEntry,
};

use crate::vault::VaultManager;

/// Parameters for [`PromptRegistry::register_prompt`].
#[derive(Clone, Debug)]
pub struct RegisterPrompt {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content_uri: String,
    pub tags: Vec<String>,
    pub license: LicenseType,
    pub price: u64,
}

/// Registration, versioning, metadata, and forking of prompt records.
#[derive(Clone)]
pub struct PromptRegistry {
    store: Arc<dyn AccountStore>,
    vault: VaultManager,
}

impl PromptRegistry {
    pub fn new(store: Arc<dyn AccountStore>, vault: VaultManager) -> Self {
        Self { store, vault }
    }

    /// Register a new prompt under a caller-chosen id. The caller becomes
    /// the author; uniqueness is decided by the derived address, so exactly
    /// one of two concurrent registrations with the same id wins.
    pub fn register_prompt(
        &self,
        caller: &Identity,
        request: RegisterPrompt,
    ) -> Result<PromptData, VaultError> {
        validate_prompt_id(&request.id)?;
        validate_content_uri(&request.content_uri)?;
        validate_tags(&request.tags)?;
        self.vault.assert_not_paused()?;

        let now = Utc::now();
        let prompt = PromptData {
            id: request.id.clone(),
            author: caller.clone(),
            title: request.title,
            description: request.description,
            content_uri: request.content_uri,
            tags: request.tags,
            license: request.license,
            price: request.price,
            status: PromptStatus::Active,
            current_version: None,
            versions: Vec::new(),
            stats: ExecutionStats::default(),
            created_at: now,
            last_updated: now,
        };

        self.store
            .create_if_absent(Address::prompt(&prompt.id), prompt.clone().into())
            .map_err(|err| match err {
                StoreError::AlreadyExists(_) => VaultError::DuplicateId(request.id),
                other => other.into(),
            })?;
        self.vault.increment_prompt_count()?;

        info!(id = %prompt.id, author = %caller, license = ?prompt.license, "prompt registered");
        Ok(prompt)
    }

    /// Append a new version to a prompt's history. Author-only. The new
    /// version string may be any shape but must differ from the current one.
    pub fn create_version(
        &self,
        caller: &Identity,
        prompt_id: &str,
        version: &str,
        content_uri: &str,
        changelog: &str,
    ) -> Result<PromptData, VaultError> {
        validate_version(version)?;
        validate_content_uri(content_uri)?;
        self.vault.assert_not_paused()?;

        let entry = VersionEntry {
            version: version.to_string(),
            content_uri: content_uri.to_string(),
            changelog: changelog.to_string(),
            timestamp: Utc::now(),
        };
        let prompt = self.mutate_prompt(
            prompt_id,
            &|prompt| authorize_author(prompt, caller),
            &mut |prompt| prompt.add_version(entry.clone()),
        )?;

        debug!(id = %prompt_id, version, "version created");
        Ok(prompt)
    }

    /// Replace a prompt's title, description, and tags wholesale.
    /// Author-only.
    pub fn update_metadata(
        &self,
        caller: &Identity,
        prompt_id: &str,
        title: String,
        description: String,
        tags: Vec<String>,
    ) -> Result<PromptData, VaultError> {
        validate_tags(&tags)?;
        self.vault.assert_not_paused()?;

        let prompt = self.mutate_prompt(
            prompt_id,
            &|prompt| authorize_author(prompt, caller),
            &mut |prompt| {
                prompt.title = title.clone();
                prompt.description = description.clone();
                prompt.tags = tags.clone();
                prompt.touch(Utc::now());
                Ok(())
            },
        )?;

        debug!(id = %prompt_id, "metadata updated");
        Ok(prompt)
    }

    /// Change a prompt's license terms. Author-only. Takes effect for
    /// subsequent executions; in-flight recordings keep the terms they read.
    pub fn update_license(
        &self,
        caller: &Identity,
        prompt_id: &str,
        license: LicenseType,
        price: u64,
    ) -> Result<PromptData, VaultError> {
        self.vault.assert_not_paused()?;

        let prompt = self.mutate_prompt(
            prompt_id,
            &|prompt| authorize_author(prompt, caller),
            &mut |prompt| {
                prompt.license = license;
                prompt.price = price;
                prompt.touch(Utc::now());
                Ok(())
            },
        )?;

        debug!(id = %prompt_id, ?license, price, "license updated");
        Ok(prompt)
    }

    /// Change a prompt's lifecycle status. The author may move a prompt
    /// through its own lifecycle; the vault admin may additionally suspend
    /// or remove any prompt.
    pub fn update_status(
        &self,
        caller: &Identity,
        prompt_id: &str,
        status: PromptStatus,
    ) -> Result<PromptData, VaultError> {
        let state = self.vault.assert_not_paused()?;

        let prompt = self.mutate_prompt(
            prompt_id,
            &|prompt| {
                if &prompt.author != caller && &state.admin != caller {
                    return Err(VaultError::Unauthorized(
                        "only the author or the vault admin may change prompt status".into(),
                    ));
                }
                Ok(())
            },
            &mut |prompt| {
                prompt.status = status;
                prompt.touch(Utc::now());
                Ok(())
            },
        )?;

        info!(id = %prompt_id, ?status, by = %caller, "status updated");
        Ok(prompt)
    }

    /// Fork an accessible, non-private prompt under a new id. The forker
    /// becomes the author of the fork; version history and statistics start
    /// empty, while content, tags, license, and price carry over.
    pub fn fork_prompt(
        &self,
        caller: &Identity,
        original_id: &str,
        new_id: &str,
        title: String,
        description: String,
    ) -> Result<PromptData, VaultError> {
        validate_prompt_id(new_id)?;
        self.vault.assert_not_paused()?;

        let original = self.load_prompt(original_id)?;
        if !original.is_accessible() {
            return Err(VaultError::PromptNotAccessible(original.status));
        }
        if original.license == LicenseType::Private {
            return Err(VaultError::ForkNotAllowed);
        }
        if &original.author == caller {
            return Err(VaultError::CannotForkOwnPrompt);
        }

        let now = Utc::now();
        let fork = PromptData {
            id: new_id.to_string(),
            author: caller.clone(),
            title,
            description,
            content_uri: original.content_uri.clone(),
            tags: original.tags.clone(),
            license: original.license,
            price: original.price,
            status: PromptStatus::Active,
            current_version: None,
            versions: Vec::new(),
            stats: ExecutionStats::default(),
            created_at: now,
            last_updated: now,
        };

        self.store
            .create_if_absent(Address::prompt(new_id), fork.clone().into())
            .map_err(|err| match err {
                StoreError::AlreadyExists(_) => VaultError::DuplicateId(new_id.to_string()),
                other => other.into(),
            })?;
        self.vault.increment_prompt_count()?;

        info!(original = %original_id, fork = %new_id, author = %caller, "prompt forked");
        Ok(fork)
    }

    /// Read a prompt record. Reads are not gated by the pause flag.
    pub fn get_prompt(&self, prompt_id: &str) -> Result<PromptData, VaultError> {
        self.load_prompt(prompt_id)
    }

    pub(crate) fn load_prompt(&self, prompt_id: &str) -> Result<PromptData, VaultError> {
        let record = self
            .store
            .fetch(&Address::prompt(prompt_id))?
            .ok_or_else(|| VaultError::NotFound(prompt_id.to_string()))?;
        prompt_of(record)
    }

    /// Authorize and apply a mutation inside the store's exclusive
    /// read-modify-write, so author edits never overwrite a concurrent
    /// stats fold with a stale snapshot. The mutation runs on a draft and
    /// commits only when it succeeds as a whole.
    fn mutate_prompt(
        &self,
        prompt_id: &str,
        authorize: &dyn Fn(&PromptData) -> Result<(), VaultError>,
        apply: &mut dyn FnMut(&mut PromptData) -> Result<(), VaultError>,
    ) -> Result<PromptData, VaultError> {
        let mut failure: Option<VaultError> = None;
        let updated = self
            .store
            .update(&Address::prompt(prompt_id), &mut |record| {
                if let AccountRecord::Prompt(prompt) = record {
                    if let Err(err) = authorize(prompt) {
                        failure = Some(err);
                        return;
                    }
                    let mut draft = prompt.clone();
                    match apply(&mut draft) {
                        Ok(()) => *prompt = draft,
                        Err(err) => failure = Some(err),
                    }
                }
            })
            .map_err(|err| match err {
                StoreError::NotFound(_) => VaultError::NotFound(prompt_id.to_string()),
                other => other.into(),
            })?;
        if let Some(err) = failure {
            return Err(err);
        }
        prompt_of(updated)
    }
}

fn prompt_of(record: AccountRecord) -> Result<PromptData, VaultError> {
    match record {
        AccountRecord::Prompt(prompt) => Ok(prompt),
        other => Err(VaultError::Store(format!(
            "prompt address holds a {:?} record",
            other.kind()
        ))),
    }
}

fn authorize_author(prompt: &PromptData, caller: &Identity) -> Result<(), VaultError> {
    if &prompt.author != caller {
        return Err(VaultError::Unauthorized(
            "only the prompt author may perform this operation".into(),
        ));
    }
    Ok(())
}
