//! Client for the remote IRT scoring service.
//!
//! The service takes a [`ScoringRequest`](crate::model::ScoringRequest) as JSON and
//! answers with a [`ScoringResponse`](crate::model::ScoringResponse). Every reply is
//! validated before it counts as success. Nothing here retries: a failed call surfaces
//! immediately and retry policy belongs to the caller.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use client::{DEFAULT_REQUEST_TIMEOUT, HttpScoringClient, ScoringClient};
pub use error::{ProtocolError, ScoringError, ScoringResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockScoringClient;
