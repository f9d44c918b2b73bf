//! IRT scoring cache (used by the gateway binary and integration tests).
//!
//! # Public API Surface
//!
//! - [`CacheAsideGateway`] - store-first resolution of scoring results
//! - [`TestId`], [`CacheKey`], [`cache_key`] - identifiers and key derivation
//! - [`ScoringRequest`], [`ScoringResponse`], [`CacheEntry`] - wire and storage format
//! - [`Store`], [`RedisStore`], [`MemoryStore`] - key-value backends
//! - [`ScoringClient`], [`HttpScoringClient`] - remote scoring service
//! - [`PayloadBuilder`], [`SubjectSource`] - request assembly from subject data
//! - [`Config`], [`ConfigError`] - environment configuration
//!
//! ## Test/Mock Support
//! [`MockScoringClient`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod gateway;
pub mod key;
pub mod model;
pub mod payload;
pub mod scoring;
pub mod server;
pub mod store;

pub use config::{Config, ConfigError};
pub use gateway::{
    CacheAsideGateway, CacheStatus, CacheWriteFailure, ErrorKind, GatewayError, GatewayResult,
    Resolution,
};
pub use key::{CacheKey, InvalidTestId, TestId, cache_key};
pub use model::{
    CacheEntry, EntryError, ResponseInvariantError, ScoringRequest, ScoringResponse,
    SubjectRecord,
};
pub use payload::{
    InMemorySubjectSource, PayloadBuilder, PayloadError, PayloadResult, SubjectSource,
};
#[cfg(any(test, feature = "mock"))]
pub use scoring::MockScoringClient;
pub use scoring::{
    HttpScoringClient, ProtocolError, ScoringClient, ScoringError, ScoringResult,
};
pub use server::{HandlerState, ServerError, create_router_with_state};
pub use store::{MemoryStore, RedisStore, RedisStoreConfig, Store, StoreError, StoreResult};
