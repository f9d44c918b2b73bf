//! Redis-backed store (deadpool connection pool).

use std::time::Duration;

use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::{Connection, Pool, Runtime};
use tracing::{debug, instrument};

use super::{Store, StoreError, StoreResult};
use crate::key::CacheKey;

/// Default maximum pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Default wait/create/recycle timeout for pooled connections.
pub const DEFAULT_POOL_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`RedisStore`].
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// `redis://` URL (may carry password and database index).
    pub url: String,
    pub pool_size: usize,
    pub timeout: Duration,
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            timeout: DEFAULT_POOL_TIMEOUT,
        }
    }

    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Store backed by Redis `GET`/`SET` with no expiry.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisStore")
            .field("pool_size", &status.size)
            .field("pool_available", &status.available)
            .finish()
    }
}

impl RedisStore {
    /// Builds the connection pool. No connection is opened until first use; call
    /// [`ping`](Store::ping) to verify reachability.
    pub fn connect(config: &RedisStoreConfig) -> StoreResult<Self> {
        let mut redis_config = deadpool_redis::Config::from_url(config.url.as_str());
        if let Some(ref mut pool_config) = redis_config.pool {
            pool_config.max_size = config.pool_size;
            pool_config.timeouts.wait = Some(config.timeout);
            pool_config.timeouts.create = Some(config.timeout);
            pool_config.timeouts.recycle = Some(config.timeout);
        } else {
            let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
            pool_config.timeouts.wait = Some(config.timeout);
            pool_config.timeouts.create = Some(config.timeout);
            pool_config.timeouts.recycle = Some(config.timeout);
            redis_config.pool = Some(pool_config);
        }

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::unavailable(format!("failed to create pool: {e}")))?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn connection(&self) -> StoreResult<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))
    }
}

fn command_error(operation: &'static str, key: &str, e: redis::RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        StoreError::unavailable(e.to_string())
    } else {
        StoreError::Command {
            operation,
            key: key.to_string(),
            message: e.to_string(),
        }
    }
}

impl Store for RedisStore {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> StoreResult<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn
            .get(key.as_str())
            .await
            .map_err(|e| command_error("GET", key.as_str(), e))?;
        debug!(found = value.is_some(), "redis GET");
        Ok(value)
    }

    #[instrument(skip(self, value), fields(key = %key, bytes = value.len()))]
    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key.as_str(), value.as_slice())
            .await
            .map_err(|e| command_error("SET", key.as_str(), e))?;
        debug!("redis SET");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("PING", "", e))?;
        debug!(reply = %pong, "redis PING");
        Ok(())
    }
}
