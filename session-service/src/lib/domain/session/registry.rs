use std::sync::Arc;
use std::time::Duration;

use crate::account::models::AccountId;
use crate::session::errors::CacheError;
use crate::session::models::SessionId;
use crate::session::ports::KeyValueCache;

/// Latest issued session per account.
///
/// At most one session id is current for an account. Entries expire with the
/// access token they were recorded for.
pub struct SessionRegistry<C>
where
    C: KeyValueCache,
{
    cache: Arc<C>,
    key_prefix: String,
}

impl<C> SessionRegistry<C>
where
    C: KeyValueCache,
{
    pub fn new(cache: Arc<C>, key_prefix: impl Into<String>) -> Self {
        Self {
            cache,
            key_prefix: key_prefix.into(),
        }
    }

    /// Make `session_id` the current session for the account. Last writer wins.
    pub async fn record_session(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.cache
            .set(&self.key(account_id), &session_id.to_string(), ttl)
            .await?;

        tracing::debug!(
            account_id = %account_id,
            session_id = %session_id,
            ttl_seconds = ttl.as_secs(),
            "Session recorded"
        );
        Ok(())
    }

    /// Current session id for the account, if one is live.
    ///
    /// An unreadable entry is treated as absent; it cannot match any token.
    pub async fn current(&self, account_id: &AccountId) -> Result<Option<SessionId>, CacheError> {
        let value = self.cache.get(&self.key(account_id)).await?;

        Ok(value.and_then(|raw| match SessionId::from_string(&raw) {
            Ok(session_id) => Some(session_id),
            Err(e) => {
                tracing::warn!(account_id = %account_id, error = %e, "Discarding unreadable session entry");
                None
            }
        }))
    }

    /// Whether a token's session has been superseded by a newer login.
    ///
    /// True only when a different session is recorded. No entry means nothing
    /// newer has happened since the entry lapsed.
    pub async fn is_stale(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
    ) -> Result<bool, CacheError> {
        Ok(self
            .current(account_id)
            .await?
            .is_some_and(|current| current != *session_id))
    }

    /// Pre-issuance guard: whether another session is still current for the account.
    pub async fn check_before_login(
        &self,
        account_id: &AccountId,
        candidate: &SessionId,
    ) -> Result<bool, CacheError> {
        Ok(self
            .current(account_id)
            .await?
            .is_some_and(|current| current != *candidate))
    }

    fn key(&self, account_id: &AccountId) -> String {
        format!("{}session:{}", self.key_prefix, account_id)
    }
}
