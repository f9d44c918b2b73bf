//! Cache-aside orchestration.
//!
//! [`CacheAsideGateway::resolve`] reads the store first and only scores remotely on a
//! miss:
//!
//! 1. `store.get(key)`; a well-formed entry is returned as [`CacheStatus::Hit`].
//! 2. Absent, corrupt or unreadable entries fall through to the miss path: build the
//!    request, call the scoring service, validate the reply.
//! 3. The reply is written back with `store.set`. A failed write does not fail the
//!    call; the response comes back as [`CacheStatus::MissNotStored`].
//!
//! Payload and scoring failures propagate and leave the store untouched.
//!
//! # Concurrency
//!
//! There is no single-flight: two concurrent misses for one test may both score and
//! both write. Writes are last-writer-wins and the service is deterministic for a given
//! request, so both converge on the same entry.

pub mod error;
pub mod types;


pub use error::{ErrorKind, GatewayError, GatewayResult};
pub use types::{
    CacheStatus, CacheWriteFailure, IRT_CACHE_HEADER, IRT_STATUS_ERROR, IRT_STATUS_HEALTHY,
    IRT_STATUS_HEADER, IRT_STATUS_NOT_READY, IRT_STATUS_READY, Resolution,
};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::key::{CacheKey, TestId, cache_key};
use crate::model::{CacheEntry, ScoringResponse};
use crate::payload::{PayloadBuilder, SubjectSource};
use crate::scoring::{ScoringClient, ScoringError};
use crate::store::{Store, StoreResult};

pub struct CacheAsideGateway<S: Store, C: ScoringClient, D: SubjectSource> {
    store: Arc<S>,
    client: Arc<C>,
    builder: Arc<PayloadBuilder<D>>,
    default_deadline: Option<Duration>,
}

impl<S: Store, C: ScoringClient, D: SubjectSource> Clone for CacheAsideGateway<S, C, D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            client: Arc::clone(&self.client),
            builder: Arc::clone(&self.builder),
            default_deadline: self.default_deadline,
        }
    }
}

impl<S: Store, C: ScoringClient, D: SubjectSource> std::fmt::Debug for CacheAsideGateway<S, C, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAsideGateway")
            .field("default_deadline", &self.default_deadline)
            .finish_non_exhaustive()
    }
}

impl<S: Store, C: ScoringClient, D: SubjectSource> CacheAsideGateway<S, C, D> {
    pub fn new(store: S, client: C, builder: PayloadBuilder<D>) -> Self {
        Self {
            store: Arc::new(store),
            client: Arc::new(client),
            builder: Arc::new(builder),
            default_deadline: None,
        }
    }

    /// Bounds every [`resolve`](Self::resolve) call by `deadline`.
    pub fn with_default_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.default_deadline = deadline;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn builder(&self) -> &PayloadBuilder<D> {
        &self.builder
    }

    pub fn default_deadline(&self) -> Option<Duration> {
        self.default_deadline
    }

    /// Returns the cached scores for `test_id`, scoring and caching them on a miss.
    pub async fn resolve(&self, test_id: &TestId) -> GatewayResult<Resolution> {
        let deadline = self.default_deadline.map(|d| Instant::now() + d);
        self.resolve_until(test_id, deadline).await
    }

    /// Like [`resolve`](Self::resolve), but the store read, the scoring call and the
    /// store write all share a budget of `deadline`.
    ///
    /// A read that runs out of time is treated as a miss, a scoring call that runs out
    /// of time fails with [`ScoringError::Transport`], and a write that runs out of time
    /// degrades to [`CacheStatus::MissNotStored`].
    pub async fn resolve_with_deadline(
        &self,
        test_id: &TestId,
        deadline: Duration,
    ) -> GatewayResult<Resolution> {
        self.resolve_until(test_id, Some(Instant::now() + deadline))
            .await
    }

    /// Store liveness check.
    pub async fn ping(&self) -> StoreResult<()> {
        self.store.ping().await
    }

    #[instrument(skip(self, deadline), fields(test_id = %test_id))]
    async fn resolve_until(
        &self,
        test_id: &TestId,
        deadline: Option<Instant>,
    ) -> GatewayResult<Resolution> {
        let key = cache_key(test_id);

        if let Some(response) = self.lookup(&key, deadline).await {
            info!(key = %key, "cache hit");
            return Ok(Resolution::hit(response));
        }

        let request = self.builder.build(test_id).await?;
        debug!(subjects = request.len(), "cache miss, calling scoring service");

        let response = within(deadline, self.client.score(&request))
            .await
            .unwrap_or_else(|| {
                Err(ScoringError::transport(
                    "deadline exceeded waiting for scoring service",
                ))
            })?;
        response.validate().map_err(ScoringError::from)?;

        Ok(self.populate(&key, response, deadline).await)
    }

    /// Reads and decodes the entry for `key`. Every failure mode is a miss.
    async fn lookup(&self, key: &CacheKey, deadline: Option<Instant>) -> Option<ScoringResponse> {
        let read = match within(deadline, self.store.get(key)).await {
            Some(read) => read,
            None => {
                warn!(key = %key, "cache read exceeded deadline, treating as miss");
                return None;
            }
        };

        match read {
            Ok(Some(bytes)) => match CacheEntry::from_bytes(bytes).decode() {
                Ok(response) => Some(response),
                Err(e) => {
                    warn!(key = %key, error = %e, "cached entry unreadable, treating as miss");
                    None
                }
            },
            Ok(None) => {
                debug!(key = %key, "cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache unavailable for read, scoring directly");
                None
            }
        }
    }

    async fn populate(
        &self,
        key: &CacheKey,
        response: ScoringResponse,
        deadline: Option<Instant>,
    ) -> Resolution {
        let entry = match CacheEntry::encode(&response) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to encode response, not caching");
                return Resolution::not_stored(response, CacheWriteFailure::Encode(e.to_string()));
            }
        };

        match within(deadline, self.store.set(key, entry.into_bytes())).await {
            Some(Ok(())) => {
                debug!(key = %key, "cached scoring response");
                Resolution::stored(response)
            }
            Some(Err(e)) => {
                warn!(key = %key, error = %e, "cache write failed, returning uncached response");
                Resolution::not_stored(response, CacheWriteFailure::Store(e))
            }
            None => {
                warn!(key = %key, "cache write exceeded deadline, returning uncached response");
                Resolution::not_stored(response, CacheWriteFailure::DeadlineExceeded)
            }
        }
    }
}

/// Runs `fut` to completion, or until `deadline` if one is set. `None` means time ran out.
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await.ok(),
        None => Some(fut.await),
    }
}
