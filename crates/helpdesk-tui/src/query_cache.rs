//! Load-once query results.
//!
//! A query is keyed by the slug it was issued for. Once it has loaded it is
//! never refetched for the same key; a blank key disables the query.

use std::future::Future;

use helpdesk_client::BackendError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState<T> {
    #[default]
    Idle,
    Ready(T),
    Failed(BackendError),
}

#[derive(Debug, Clone, Default)]
pub struct CachedQuery<T> {
    key: Option<String>,
    state: QueryState<T>,
    fetches: u64,
}

impl<T> CachedQuery<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            key: None,
            state: QueryState::Idle,
            fetches: 0,
        }
    }

    /// Loads the value for `key` unless it is already cached. Failed loads
    /// are retried on the next call.
    pub async fn load<F, Fut>(&mut self, key: &str, fetch: F) -> Option<&T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let cached = self.key.as_deref() == Some(key) && matches!(self.state, QueryState::Ready(_));
        if !cached {
            self.fetches = self.fetches.saturating_add(1);
            self.key = Some(key.to_owned());
            self.state = match fetch().await {
                Ok(value) => QueryState::Ready(value),
                Err(err) => {
                    tracing::warn!(key, error = %err, "query failed");
                    QueryState::Failed(err)
                }
            };
        }
        self.value()
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.state {
            QueryState::Ready(value) => Some(value),
            QueryState::Idle | QueryState::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    /// Number of fetches issued so far.
    #[must_use]
    pub fn fetches(&self) -> u64 {
        self.fetches
    }
}
