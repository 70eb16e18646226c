use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::Username;

/// Credential store operations.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Retrieve an account with its roles by username.
    ///
    /// # Returns
    /// Optional account (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AccountError>;

    /// Persist a new account and link its roles.
    ///
    /// The account row and every role link become visible together or not at all.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `UnknownRole` - A role on the account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;
}
