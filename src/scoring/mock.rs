//! Scripted [`ScoringClient`] for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::client::ScoringClient;
use super::error::{ScoringError, ScoringResult};
use crate::model::{ScoringRequest, ScoringResponse};

/// Returns queued replies in order, then repeats the fallback reply.
///
/// Replies are handed back as-is; validation is the caller's job, which lets tests
/// feed invalid responses straight to the gateway.
pub struct MockScoringClient {
    queued: Mutex<VecDeque<ScoringResult<ScoringResponse>>>,
    fallback: ScoringResult<ScoringResponse>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ScoringRequest>>,
}

impl MockScoringClient {
    /// Always answers with `response`.
    pub fn responding(response: ScoringResponse) -> Self {
        Self::with_fallback(Ok(response))
    }

    /// Always fails with `error`.
    pub fn failing(error: ScoringError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: ScoringResult<ScoringResponse>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a one-off reply served before the fallback.
    pub fn then(self, reply: ScoringResult<ScoringResponse>) -> Self {
        self.queued.lock().push_back(reply);
        self
    }

    /// Sleeps before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ScoringRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<ScoringRequest> {
        self.requests.lock().last().cloned()
    }
}

impl ScoringClient for MockScoringClient {
    async fn score(&self, request: &ScoringRequest) -> ScoringResult<ScoringResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.queued.lock().pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }
}
