//! Account lifecycle operations glued to the client registry.
//!
//! [`AccountService`] owns the account-facing use cases: opening,
//! updating, closing, and reading accounts. Every read joins the owner's
//! display name from the registry; creation refuses to proceed without a
//! confirmed owner, while reads degrade to placeholder names so a
//! registry outage never breaks them.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use ledgra_core::account::{validate_update, Account, AccountUpdate, NewAccount};
use ledgra_core::client::{display_name_or_placeholder, ClientDirectory};
use ledgra_core::ledger::LedgerError;
use ledgra_db::{AccountRepository, MovementRepository};
use ledgra_shared::error::AppError;
use ledgra_shared::types::{AccountId, ClientId};

use crate::lookup::NameCache;

/// An account joined with its owner's display name.
///
/// The name is denormalized from the registry at read time and is never
/// stored with the account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    /// The stored account.
    #[serde(flatten)]
    pub account: Account,
    /// Owner name as the registry reports it, or a placeholder when the
    /// registry cannot answer.
    pub owner_display_name: String,
}

/// Account use cases over the repositories and the client registry.
pub struct AccountService {
    accounts: AccountRepository,
    movements: MovementRepository,
    directory: Arc<dyn ClientDirectory>,
    names: NameCache,
}

impl AccountService {
    /// Creates the service over its collaborators.
    #[must_use]
    pub fn new(
        accounts: AccountRepository,
        movements: MovementRepository,
        directory: Arc<dyn ClientDirectory>,
        names: NameCache,
    ) -> Self {
        Self {
            accounts,
            movements,
            directory,
            names,
        }
    }

    /// Opens an account for a registry client.
    ///
    /// The owner is fetched from the registry first and any lookup
    /// failure aborts the operation: an account is never created for a
    /// client the registry did not confirm.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the registry has no such client,
    /// `RemoteError` when the registry could not be consulted, and the
    /// usual validation and duplicate errors from account creation.
    pub async fn open_account(&self, input: NewAccount) -> Result<AccountView, AppError> {
        let owner = self.directory.fetch(&input.owner_client_id).await?;

        let account: Account = self.accounts.create_account(input).await?.into();
        self.names
            .insert(account.owner_client_id.clone(), owner.display_name.clone());

        info!(
            account_number = %account.account_number,
            client_id = %account.owner_client_id,
            opening_balance = %account.opening_balance,
            "Account created"
        );

        Ok(AccountView {
            account,
            owner_display_name: owner.display_name,
        })
    }

    /// Applies a full-record update to an account.
    ///
    /// Immutable fields must be echoed unchanged, and the opening
    /// balance may only change while the account has no movements.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account and `Conflict` when the
    /// update touches an immutable or locked field.
    pub async fn update_account(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<AccountView, AppError> {
        let current: Account = self
            .accounts
            .find_account_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?
            .into();

        let movement_count = self.movements.count_movements(id).await?;
        let patch = validate_update(&current, &update, movement_count)?;

        let account = if patch.is_empty() {
            current
        } else {
            let updated: Account = self.accounts.update_account(id, patch).await?.into();
            info!(
                account_id = %id,
                account_number = %updated.account_number,
                "Account updated"
            );
            updated
        };

        Ok(self.view_of(account).await)
    }

    /// Deletes an account together with its movement history.
    ///
    /// The registry is not consulted: closing is a local decision.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account.
    pub async fn close_account(&self, id: AccountId) -> Result<(), AppError> {
        self.accounts.delete_account(id).await?;
        info!(account_id = %id, "Account closed and its movements removed");
        Ok(())
    }

    /// Fetches one account by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account.
    pub async fn get_account(&self, id: AccountId) -> Result<AccountView, AppError> {
        let account: Account = self
            .accounts
            .find_account_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?
            .into();

        Ok(self.view_of(account).await)
    }

    /// Fetches one account by its business number.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account number.
    pub async fn get_account_by_number(&self, number: &str) -> Result<AccountView, AppError> {
        let account: Account = self
            .accounts
            .find_account_by_number(number)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(number.to_string()))?
            .into();

        Ok(self.view_of(account).await)
    }

    /// Lists all accounts ordered by account number.
    ///
    /// # Errors
    ///
    /// Returns `Database` when the listing fails.
    pub async fn list_accounts(&self) -> Result<Vec<AccountView>, AppError> {
        let accounts = self.accounts.list_accounts().await?;

        let mut views = Vec::with_capacity(accounts.len());
        for account in accounts {
            views.push(self.view_of(account.into()).await);
        }
        Ok(views)
    }

    async fn view_of(&self, account: Account) -> AccountView {
        let owner_display_name =
            resolve_owner_name(self.directory.as_ref(), &self.names, &account.owner_client_id)
                .await;
        AccountView {
            account,
            owner_display_name,
        }
    }
}

/// Resolves a client's display name through the cache, degrading to a
/// placeholder when the registry cannot answer. Placeholders are never
/// cached, so the next read retries the lookup.
async fn resolve_owner_name(
    directory: &dyn ClientDirectory,
    names: &NameCache,
    client: &ClientId,
) -> String {
    if let Some(name) = names.get(client) {
        return name;
    }

    match directory.fetch(client).await {
        Ok(summary) => {
            names.insert(client.clone(), summary.display_name.clone());
            summary.display_name
        }
        Err(err) => {
            warn!(
                client_id = %client,
                error = %err,
                "Owner name lookup failed, serving placeholder"
            );
            display_name_or_placeholder(Err(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ledgra_core::client::{
        ClientSummary, DirectoryError, CLIENT_LOOKUP_FAILED_PLACEHOLDER,
        CLIENT_NOT_FOUND_PLACEHOLDER,
    };
    use ledgra_shared::config::RegistryConfig;

    use super::*;

    enum Answer {
        Found(&'static str),
        Missing,
        Down,
    }

    struct ScriptedDirectory {
        answer: Answer,
        fetches: AtomicUsize,
    }

    impl ScriptedDirectory {
        fn new(answer: Answer) -> Self {
            Self {
                answer,
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClientDirectory for ScriptedDirectory {
        async fn fetch(&self, client: &ClientId) -> Result<ClientSummary, DirectoryError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Answer::Found(name) => Ok(ClientSummary {
                    id: client.clone(),
                    display_name: name.to_string(),
                    active: true,
                }),
                Answer::Missing => Err(DirectoryError::NotFound(client.clone())),
                Answer::Down => Err(DirectoryError::Remote("connection refused".to_string())),
            }
        }
    }

    fn name_cache() -> NameCache {
        NameCache::new(&RegistryConfig {
            base_url: "http://localhost".to_string(),
            request_timeout_ms: 1_000,
            name_cache_ttl_secs: 60,
            name_cache_capacity: 32,
        })
    }

    #[tokio::test]
    async fn test_resolve_caches_successful_lookups() {
        let directory = ScriptedDirectory::new(Answer::Found("Jose Lema"));
        let names = name_cache();
        let client = ClientId::from("CLI-1");

        assert_eq!(resolve_owner_name(&directory, &names, &client).await, "Jose Lema");
        assert_eq!(resolve_owner_name(&directory, &names, &client).await, "Jose Lema");
        assert_eq!(directory.fetch_count(), 1, "second read must hit the cache");
    }

    #[tokio::test]
    async fn test_resolve_prefers_cached_name() {
        let directory = ScriptedDirectory::new(Answer::Down);
        let names = name_cache();
        let client = ClientId::from("CLI-2");
        names.insert(client.clone(), "Marianela".to_string());

        assert_eq!(resolve_owner_name(&directory, &names, &client).await, "Marianela");
        assert_eq!(directory.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_degrades_missing_client_without_caching() {
        let directory = ScriptedDirectory::new(Answer::Missing);
        let names = name_cache();
        let client = ClientId::from("CLI-3");

        assert_eq!(
            resolve_owner_name(&directory, &names, &client).await,
            CLIENT_NOT_FOUND_PLACEHOLDER
        );
        assert_eq!(
            resolve_owner_name(&directory, &names, &client).await,
            CLIENT_NOT_FOUND_PLACEHOLDER
        );
        assert_eq!(directory.fetch_count(), 2, "placeholders must not be cached");
    }

    #[tokio::test]
    async fn test_resolve_degrades_registry_outage() {
        let directory = ScriptedDirectory::new(Answer::Down);
        let names = name_cache();

        assert_eq!(
            resolve_owner_name(&directory, &names, &ClientId::from("CLI-4")).await,
            CLIENT_LOOKUP_FAILED_PLACEHOLDER
        );
    }
}
