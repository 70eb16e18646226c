use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::RoleName;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;

/// Process-local credential store.
///
/// Registration checks and inserts under one write lock, so a rejected account
/// leaves nothing behind.
#[derive(Debug, Clone)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    roles: Arc<HashSet<String>>,
}

impl InMemoryAccountRepository {
    /// Create a store that knows the given role names.
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            roles: Arc::new(roles.into_iter().map(Into::into).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    fn check_role(&self, role: &RoleName) -> Result<(), AccountError> {
        if self.roles.contains(role.as_str()) {
            Ok(())
        } else {
            Err(AccountError::UnknownRole(role.as_str().to_string()))
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::with_roles(["ROLE_USER", "ROLE_ADMIN"])
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.read().await.get(username.as_str()).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(account.username.as_str()) {
            return Err(AccountError::UsernameAlreadyExists(
                account.username.as_str().to_string(),
            ));
        }
        for role in &account.roles {
            self.check_role(role)?;
        }

        accounts.insert(account.username.as_str().to_string(), account.clone());
        Ok(account)
    }
}
