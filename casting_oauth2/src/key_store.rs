//! A cache of the identity provider's signing keys
//!
//! The store keeps one snapshot of the key set behind an [`ArcSwap`], so
//! lookups never block. When a lookup misses, or the snapshot has outlived
//! its cache lifetime, the caller refreshes the snapshot. Refreshes are
//! single-flight: concurrent callers queue on one lock, and any caller that
//! finds a newer snapshot once it holds the lock uses that instead of
//! fetching again.

use std::{fmt, sync::Arc, time::Duration};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use casting_jose::{
    clock::{Clock, System, UnixTime},
    jwa, jwk, Jwk, Jwks,
};

use crate::{AuthError, KeyFetchError};

const MIN_BACKGROUND_REFRESH: Duration = Duration::from_secs(1);

mod local;
#[cfg(feature = "reqwest")]
mod remote;

pub use local::StaticJwks;
#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub use remote::RemoteJwks;

/// A place the current key set can be fetched from
#[async_trait]
pub trait JwksSource: fmt::Debug + Send + Sync {
    /// Fetches the complete current key set
    async fn fetch(&self) -> Result<Jwks, KeyFetchError>;
}

#[async_trait]
impl<S: JwksSource + ?Sized> JwksSource for Arc<S> {
    async fn fetch(&self) -> Result<Jwks, KeyFetchError> {
        S::fetch(self).await
    }
}

/// Tuning for a [`KeyStore`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct KeyStoreOptions {
    cache_ttl: Duration,
    min_refresh_interval: Duration,
    retry_delay: Duration,
}

impl Default for KeyStoreOptions {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(600),
            min_refresh_interval: Duration::from_secs(10),
            retry_delay: Duration::from_millis(250),
        }
    }
}

impl KeyStoreOptions {
    /// How long a fetched key set is trusted before it is fetched again
    pub fn with_cache_ttl(self, cache_ttl: Duration) -> Self {
        Self { cache_ttl, ..self }
    }

    /// How long after a fetch an unknown key ID is reported without
    /// fetching again
    pub fn with_min_refresh_interval(self, min_refresh_interval: Duration) -> Self {
        Self {
            min_refresh_interval,
            ..self
        }
    }

    /// How long to wait before retrying a failed fetch
    pub fn with_retry_delay(self, retry_delay: Duration) -> Self {
        Self {
            retry_delay,
            ..self
        }
    }

    /// The configured cache lifetime
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// The configured refresh cool-down
    #[must_use]
    pub fn min_refresh_interval(&self) -> Duration {
        self.min_refresh_interval
    }

    /// The configured retry delay
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

#[derive(Debug)]
struct Snapshot {
    jwks: Jwks,
    fetched_at: Option<UnixTime>,
    generation: u64,
}

impl Snapshot {
    fn age(&self, now: UnixTime) -> Option<Duration> {
        self.fetched_at
            .map(|at| Duration::from_secs(now.secs_since(at)))
    }
}

struct Inner {
    snapshot: ArcSwap<Snapshot>,
    refresh_lock: tokio::sync::Mutex<()>,
    source: Box<dyn JwksSource>,
    options: KeyStoreOptions,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("snapshot", &self.snapshot)
            .field("source", &self.source)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A shared, lazily refreshed cache of signing keys
///
/// Clones share the same cache.
#[derive(Debug, Clone)]
#[must_use]
pub struct KeyStore {
    inner: Arc<Inner>,
}

impl KeyStore {
    /// Constructs an empty key store reading the wall clock
    ///
    /// Nothing is fetched until the first lookup or [`refresh`][Self::refresh].
    pub fn new(source: impl JwksSource + 'static, options: KeyStoreOptions) -> Self {
        Self::with_clock(source, options, Arc::new(System))
    }

    /// Constructs an empty key store reading the given clock
    pub fn with_clock(
        source: impl JwksSource + 'static,
        options: KeyStoreOptions,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let snapshot = Snapshot {
            jwks: Jwks::default(),
            fetched_at: None,
            generation: 0,
        };

        Self {
            inner: Arc::new(Inner {
                snapshot: ArcSwap::from_pointee(snapshot),
                refresh_lock: tokio::sync::Mutex::new(()),
                source: Box::new(source),
                options,
                clock,
            }),
        }
    }

    /// The options this store was built with
    pub fn options(&self) -> KeyStoreOptions {
        self.inner.options
    }

    /// When the current key set was fetched, if ever
    #[must_use]
    pub fn last_refreshed(&self) -> Option<UnixTime> {
        self.inner.snapshot.load().fetched_at
    }

    /// Resolves the key with the given ID that can verify `alg` signatures
    ///
    /// A fresh snapshot answers directly. Otherwise the key set is refreshed
    /// once and consulted again. An unknown key ID seen shortly after a
    /// successful fetch is reported without fetching again.
    ///
    /// # Errors
    ///
    /// * [`AuthError::UnknownKey`] if no such key exists after a refresh
    /// * [`AuthError::KeyUnavailable`] if the key set could not be fetched
    pub async fn get_key(
        &self,
        kid: &jwk::KeyIdRef,
        alg: jwa::SigningAlgorithm,
    ) -> Result<Jwk, AuthError> {
        let observed = self.inner.snapshot.load_full();
        let age = observed.age(self.inner.clock.now());

        if let Some(age) = age {
            if age < self.inner.options.cache_ttl {
                if let Some(key) = observed.jwks.get_key_by_id(kid, alg) {
                    return Ok(key.clone());
                }

                if age < self.inner.options.min_refresh_interval {
                    tracing::debug!(%kid, %alg, "unknown key ID; key set fetched recently");
                    return Err(AuthError::UnknownKey);
                }
            }
        }

        let current = match self.refresh_after(observed.generation).await {
            Ok(current) => current,
            Err(err) => {
                if let Some(key) = observed.jwks.get_key_by_id(kid, alg) {
                    let error: &dyn std::error::Error = &err;
                    tracing::warn!(error, %kid, "serving key from expired key set");
                    return Ok(key.clone());
                }
                return Err(err.into());
            }
        };

        current
            .jwks
            .get_key_by_id(kid, alg)
            .cloned()
            .ok_or_else(|| {
                tracing::debug!(%kid, %alg, "unable to find matching key");
                AuthError::UnknownKey
            })
    }

    /// Fetches the key set now, regardless of cache state
    ///
    /// If a refresh is already underway, waits for it instead of starting
    /// another. If fetching fails, the previous key set stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the key set could not be fetched, even after
    /// one retry.
    pub async fn refresh(&self) -> Result<(), KeyFetchError> {
        let generation = self.inner.snapshot.load().generation;
        self.refresh_after(generation).await.map(|_| ())
    }

    /// Spawns a task that refreshes the key set on the given interval
    ///
    /// The first refresh happens one interval from now. Failures are logged
    /// and retried on the next tick. Intervals shorter than one second are
    /// raised to one second.
    pub fn spawn_refresh(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        // `tokio::time::interval` panics on a zero period
        let interval = interval.max(MIN_BACKGROUND_REFRESH);

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await;

            loop {
                timer.tick().await;
                // Failures are already logged; try again next time
                let _ = this.refresh().await;
            }
        })
    }

    /// Replaces the snapshot unless one newer than `seen` already exists
    #[tracing::instrument(level = "debug", skip(self))]
    async fn refresh_after(&self, seen: u64) -> Result<Arc<Snapshot>, KeyFetchError> {
        let _guard = self.inner.refresh_lock.lock().await;

        let current = self.inner.snapshot.load_full();
        if current.generation != seen {
            tracing::debug!("key set refreshed while waiting");
            return Ok(current);
        }

        let jwks = self.fetch_with_retry().await?;
        let next = Arc::new(Snapshot {
            jwks,
            fetched_at: Some(self.inner.clock.now()),
            generation: current.generation + 1,
        });

        self.inner.snapshot.store(Arc::clone(&next));
        tracing::info!(jwks.keys = next.jwks.keys().len(), "JWKS refreshed");

        Ok(next)
    }

    async fn fetch_with_retry(&self) -> Result<Jwks, KeyFetchError> {
        match self.inner.source.fetch().await {
            Ok(jwks) => Ok(jwks),
            Err(err) => {
                {
                    let error: &dyn std::error::Error = &err;
                    tracing::warn!(error, "JWKS fetch failed; retrying");
                }
                tokio::time::sleep(self.inner.options.retry_delay).await;

                self.inner.source.fetch().await.map_err(|err| {
                    let error: &dyn std::error::Error = &err;
                    tracing::warn!(error, "JWKS refresh failed");
                    err
                })
            }
        }
    }
}
