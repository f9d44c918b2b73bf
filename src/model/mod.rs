//! Wire and storage types shared by the gateway, the scoring client and the store.
//!
//! Field names follow the scoring service's JSON contract; maps are ordered so that
//! serialized requests and cache entries are byte-for-byte deterministic.

mod entry;
pub mod error;


pub use entry::CacheEntry;
pub use error::{EntryError, ResponseInvariantError};

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Per-subject task-performance counters, one per task type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub task1: u32,
    pub task2: u32,
    pub task3: u32,
}

impl SubjectRecord {
    pub const fn new(task1: u32, task2: u32, task3: u32) -> Self {
        Self {
            task1,
            task2,
            task3,
        }
    }
}

/// Request body sent to the scoring service: `{"subjects": {<id>: {...}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub subjects: BTreeMap<String, SubjectRecord>,
}

impl ScoringRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subjects in the request.
    #[inline]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn get(&self, subject_id: &str) -> Option<&SubjectRecord> {
        self.subjects.get(subject_id)
    }
}

/// Calibrated estimates returned by the scoring service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringResponse {
    /// Subject id -> ability estimate.
    pub abilities: BTreeMap<String, f64>,

    /// Task id -> difficulty estimate.
    #[serde(rename = "difficult")]
    pub difficulties: BTreeMap<String, f64>,

    /// Global goodness-of-fit metric.
    #[serde(rename = "err")]
    pub fit_error: f64,

    /// Tasks excluded from estimation. Required on the wire, may be empty.
    pub rejected_tasks: Vec<String>,

    /// Subjects excluded from estimation. Required on the wire, may be empty.
    pub rejected_subjects: Vec<String>,
}

impl ScoringResponse {
    /// Checks the invariants every accepted response must hold.
    ///
    /// - `fit_error` is finite and non-negative
    /// - no subject is both in `abilities` and `rejected_subjects`
    /// - no task is both in `difficulties` and `rejected_tasks`
    pub fn validate(&self) -> Result<(), ResponseInvariantError> {
        if !self.fit_error.is_finite() {
            return Err(ResponseInvariantError::NonFiniteFitError {
                value: self.fit_error,
            });
        }
        if self.fit_error < 0.0 {
            return Err(ResponseInvariantError::NegativeFitError {
                value: self.fit_error,
            });
        }

        if let Some(subject_id) = first_overlap(&self.abilities, &self.rejected_subjects) {
            return Err(ResponseInvariantError::RejectedSubjectEstimated { subject_id });
        }
        if let Some(task_id) = first_overlap(&self.difficulties, &self.rejected_tasks) {
            return Err(ResponseInvariantError::RejectedTaskEstimated { task_id });
        }

        Ok(())
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn first_overlap(estimates: &BTreeMap<String, f64>, rejected: &[String]) -> Option<String> {
    if estimates.is_empty() || rejected.is_empty() {
        return None;
    }
    let rejected: HashSet<&str> = rejected.iter().map(String::as_str).collect();
    estimates
        .keys()
        .find(|id| rejected.contains(id.as_str()))
        .cloned()
}
