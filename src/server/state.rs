use std::sync::Arc;

use crate::gateway::CacheAsideGateway;
use crate::payload::SubjectSource;
use crate::scoring::ScoringClient;
use crate::store::Store;

pub struct HandlerState<S: Store, C: ScoringClient, D: SubjectSource> {
    pub gateway: Arc<CacheAsideGateway<S, C, D>>,

    /// Label reported by `/ready` (`redis` or `memory`).
    pub store_backend: &'static str,
}

impl<S: Store, C: ScoringClient, D: SubjectSource> Clone for HandlerState<S, C, D> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            store_backend: self.store_backend,
        }
    }
}

impl<S: Store, C: ScoringClient, D: SubjectSource> HandlerState<S, C, D> {
    pub fn new(gateway: CacheAsideGateway<S, C, D>, store_backend: &'static str) -> Self {
        Self {
            gateway: Arc::new(gateway),
            store_backend,
        }
    }
}
