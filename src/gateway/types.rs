use crate::model::ScoringResponse;
use crate::store::StoreError;

/// Cache outcome of a scores response: `HIT`, `MISS` or `MISS_NOT_STORED`.
pub const IRT_CACHE_HEADER: &str = "X-Irt-Cache";
/// Service status on health, readiness and error responses.
pub const IRT_STATUS_HEADER: &str = "X-Irt-Status";
pub const IRT_STATUS_HEALTHY: &str = "healthy";
pub const IRT_STATUS_READY: &str = "ready";
pub const IRT_STATUS_NOT_READY: &str = "not_ready";
pub const IRT_STATUS_ERROR: &str = "error";

/// How a resolved response was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// Served from the store; no scoring call was made.
    Hit,
    /// Scored remotely and written to the store.
    Miss,
    /// Scored remotely but the store write failed.
    MissNotStored,
}

impl CacheStatus {
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::MissNotStored => "MISS_NOT_STORED",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}

/// Why a freshly scored response did not make it into the store.
#[derive(Debug, Clone)]
pub enum CacheWriteFailure {
    /// The store rejected or could not take the write.
    Store(StoreError),
    /// The response could not be serialized.
    Encode(String),
    /// The deadline ran out before the write finished.
    DeadlineExceeded,
}

impl std::fmt::Display for CacheWriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheWriteFailure::Store(e) => write!(f, "{e}"),
            CacheWriteFailure::Encode(reason) => write!(f, "encode failed: {reason}"),
            CacheWriteFailure::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Outcome of [`CacheAsideGateway::resolve`](super::CacheAsideGateway::resolve).
#[derive(Debug, Clone)]
pub struct Resolution {
    pub response: ScoringResponse,
    pub status: CacheStatus,
    /// Set only when `status` is [`CacheStatus::MissNotStored`].
    pub write_failure: Option<CacheWriteFailure>,
}

impl Resolution {
    pub(crate) fn hit(response: ScoringResponse) -> Self {
        Self {
            response,
            status: CacheStatus::Hit,
            write_failure: None,
        }
    }

    pub(crate) fn stored(response: ScoringResponse) -> Self {
        Self {
            response,
            status: CacheStatus::Miss,
            write_failure: None,
        }
    }

    pub(crate) fn not_stored(response: ScoringResponse, failure: CacheWriteFailure) -> Self {
        Self {
            response,
            status: CacheStatus::MissNotStored,
            write_failure: Some(failure),
        }
    }

    /// `true` when the response was computed but could not be cached.
    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.write_failure.is_some()
    }

    pub fn into_response(self) -> ScoringResponse {
        self.response
    }
}
