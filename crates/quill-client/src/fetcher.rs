//! Cached data loading for list and detail views.
//!
//! Every view asks a [`Fetcher`] for a [`FetchKey`] and renders the returned
//! [`FetchState`]. Responses are cached per key. Each load is stamped with a
//! generation number; a response whose generation has been superseded (by a
//! newer load or an invalidation) is dropped instead of overwriting newer data.
//! A load whose caller goes away mid-request leaves the entry reloadable.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use crate::client::BlogClient;
use crate::credential::Credential;
use crate::error::ClientError;

/// Cache key: API path plus the credential it is read with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    path: String,
    credential: Option<Credential>,
}

impl FetchKey {
    /// `path` is relative to `/api`, e.g. `/posts/3`.
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            credential: None,
        }
    }

    pub fn authenticated(path: impl Into<String>, credential: &Credential) -> Self {
        Self {
            path: path.into(),
            credential: Some(credential.clone()),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}

/// What a view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub is_loading: bool,
}

impl<T> FetchState<T> {
    fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
        }
    }
}

struct Entry<T> {
    state: FetchState<T>,
    generation: u64,
}

type Entries<T> = Mutex<HashMap<FetchKey, Entry<T>>>;

type Loader<T> = Arc<dyn Fn(FetchKey) -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync>;

/// Keyed, cached loader shared by all views of one resource type.
pub struct Fetcher<T> {
    loader: Loader<T>,
    entries: Entries<T>,
    generation: AtomicU64,
}

fn lock<T>(entries: &Entries<T>) -> MutexGuard<'_, HashMap<FetchKey, Entry<T>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears `is_loading` if the load it guards is dropped before finishing.
struct LoadGuard<'a, T> {
    entries: &'a Entries<T>,
    key: &'a FetchKey,
    generation: u64,
    finished: bool,
}

impl<T> Drop for LoadGuard<'_, T> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let mut entries = lock(self.entries);
        if let Some(entry) = entries.get_mut(self.key) {
            if entry.generation == self.generation {
                tracing::debug!(path = self.key.path(), "Fetch cancelled");
                entry.state.is_loading = false;
            }
        }
    }
}

impl<T> Fetcher<T>
where
    T: Clone + Send + 'static,
{
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn(FetchKey) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        Self {
            loader: Arc::new(move |key| loader(key).boxed()),
            entries: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Load through a [`BlogClient`], decoding each response as `T`.
    pub fn from_client(client: BlogClient) -> Self
    where
        T: DeserializeOwned,
    {
        Self::new(move |key: FetchKey| {
            let client = client.clone();
            async move { client.get_json::<T>(&key).await }
        })
    }

    /// Cached state for `key`, loading it first if nothing is cached yet.
    pub async fn fetch(&self, key: &FetchKey) -> FetchState<T> {
        {
            let entries = lock(&self.entries);
            if let Some(entry) = entries.get(key) {
                if entry.state.data.is_some() || entry.state.is_loading {
                    return entry.state.clone();
                }
            }
        }

        self.load(key).await
    }

    /// Load `key` again even if it is cached. Cached data stays visible meanwhile.
    pub async fn refresh(&self, key: &FetchKey) -> FetchState<T> {
        self.load(key).await
    }

    /// Current state without triggering a load.
    pub async fn peek(&self, key: &FetchKey) -> FetchState<T> {
        lock(&self.entries)
            .get(key)
            .map(|entry| entry.state.clone())
            .unwrap_or_else(FetchState::idle)
    }

    /// Drop the cached entry; an in-flight load for it will be discarded.
    pub async fn invalidate(&self, key: &FetchKey) {
        lock(&self.entries).remove(key);
    }

    /// Drop every cached entry whose path starts with `prefix`, e.g. after a write.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        lock(&self.entries).retain(|key, _| !key.path.starts_with(prefix));
    }

    async fn load(&self, key: &FetchKey) -> FetchState<T> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut entries = lock(&self.entries);
            let entry = entries.entry(key.clone()).or_insert_with(|| Entry {
                state: FetchState::idle(),
                generation,
            });
            entry.generation = generation;
            entry.state.is_loading = true;
            entry.state.error = None;
        }

        let mut guard = LoadGuard {
            entries: &self.entries,
            key,
            generation,
            finished: false,
        };
        let result = (self.loader)(key.clone()).await;
        guard.finished = true;

        let mut entries = lock(&self.entries);
        match entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                match result {
                    Ok(data) => {
                        entry.state.data = Some(data);
                        entry.state.error = None;
                    }
                    Err(e) => {
                        tracing::debug!(path = key.path(), error = %e, "Fetch failed");
                        entry.state.error = Some(e.to_string());
                    }
                }
                entry.state.is_loading = false;
                entry.state.clone()
            }
            Some(entry) => {
                tracing::debug!(path = key.path(), generation, "Discarding superseded response");
                entry.state.clone()
            }
            None => {
                tracing::debug!(path = key.path(), generation, "Discarding response for invalidated key");
                FetchState::idle()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn counting_fetcher(calls: Arc<AtomicUsize>) -> Fetcher<String> {
        Fetcher::new(move |key: FetchKey| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(format!("{}#{n}", key.path())) }
        })
    }

    #[tokio::test]
    async fn test_fetch_is_cached_per_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = counting_fetcher(calls.clone());
        let key = FetchKey::public("/posts");

        let first = fetcher.fetch(&key).await;
        let second = fetcher.fetch(&key).await;

        assert_eq!(first.data.as_deref(), Some("/posts#0"));
        assert_eq!(second, first);
        assert!(!second.is_loading);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_credential_is_part_of_the_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = counting_fetcher(calls.clone());

        fetcher.fetch(&FetchKey::public("/admin/posts")).await;
        fetcher
            .fetch(&FetchKey::authenticated("/admin/posts", &Credential::new("a")))
            .await;
        fetcher
            .fetch(&FetchKey::authenticated("/admin/posts", &Credential::new("b")))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = counting_fetcher(calls.clone());
        let key = FetchKey::public("/categories");

        fetcher.fetch(&key).await;
        fetcher.invalidate(&key).await;
        assert_eq!(fetcher.peek(&key).await, FetchState::idle());

        let state = fetcher.fetch(&key).await;
        assert_eq!(state.data.as_deref(), Some("/categories#1"));

        fetcher.invalidate_prefix("/cat").await;
        assert!(fetcher.peek(&key).await.data.is_none());
    }

    #[tokio::test]
    async fn test_error_is_reported_and_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher: Fetcher<String> = {
            let calls = calls.clone();
            Fetcher::new(move |_key: FetchKey| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ClientError::Api {
                            status: 404,
                            message: "Post 9 not found".to_string(),
                        })
                    } else {
                        Ok("post 9".to_string())
                    }
                }
            })
        };
        let key = FetchKey::public("/posts/9");

        let state = fetcher.fetch(&key).await;
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("API error (404): Post 9 not found"));

        let retried = fetcher.fetch(&key).await;
        assert_eq!(retried.data.as_deref(), Some("post 9"));
        assert!(retried.error.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_can_be_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = {
            let calls = calls.clone();
            Arc::new(Fetcher::new(move |_key: FetchKey| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        futures::future::pending::<()>().await;
                    }
                    Ok("loaded".to_string())
                }
            }))
        };
        let key = FetchKey::public("/posts/2");

        let abandoned = {
            let fetcher = fetcher.clone();
            let key = key.clone();
            tokio::spawn(async move { fetcher.fetch(&key).await })
        };
        while !fetcher.peek(&key).await.is_loading {
            tokio::task::yield_now().await;
        }
        abandoned.abort();
        assert!(abandoned.await.unwrap_err().is_cancelled());
        assert!(!fetcher.peek(&key).await.is_loading);

        let state = fetcher.fetch(&key).await;
        assert_eq!(state.data.as_deref(), Some("loaded"));
        assert!(!state.is_loading);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_superseded_response_does_not_overwrite_newer_data() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = {
            let gate = gate.clone();
            let calls = calls.clone();
            Arc::new(Fetcher::new(move |_key: FetchKey| {
                let gate = gate.clone();
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        gate.notified().await;
                        Ok("stale".to_string())
                    } else {
                        Ok("fresh".to_string())
                    }
                }
            }))
        };
        let key = FetchKey::public("/posts/1");

        let slow = {
            let fetcher = fetcher.clone();
            let key = key.clone();
            tokio::spawn(async move { fetcher.fetch(&key).await })
        };
        while !fetcher.peek(&key).await.is_loading {
            tokio::task::yield_now().await;
        }

        let fresh = fetcher.refresh(&key).await;
        assert_eq!(fresh.data.as_deref(), Some("fresh"));

        gate.notify_one();
        let late = slow.await.unwrap();

        assert_eq!(late.data.as_deref(), Some("fresh"));
        assert_eq!(fetcher.peek(&key).await.data.as_deref(), Some("fresh"));
    }
}
