//! In-memory subject data, optionally seeded from a JSON file.
//!
//! Seed format: `{"<test id>": {"<subject id>": {"task1": n, "task2": n, "task3": n}}}`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use parking_lot::RwLock;
use tracing::info;

use super::error::{PayloadError, PayloadResult};
use super::SubjectSource;
use crate::key::TestId;
use crate::model::SubjectRecord;

type SeedFile = BTreeMap<String, BTreeMap<String, SubjectRecord>>;

#[derive(Debug, Default)]
pub struct InMemorySubjectSource {
    tests: RwLock<HashMap<TestId, Vec<(String, SubjectRecord)>>>,
}

impl InMemorySubjectSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads seed data from a JSON file.
    pub fn from_json_file(path: &Path) -> PayloadResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| PayloadError::SeedIo {
            path: path.to_path_buf(),
            source,
        })?;
        let seed: SeedFile =
            serde_json::from_str(&raw).map_err(|source| PayloadError::SeedParse {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::from_seed(seed)?;
        info!(path = %path.display(), tests = store.len(), "loaded subject data");
        Ok(store)
    }

    fn from_seed(seed: SeedFile) -> PayloadResult<Self> {
        let store = Self::new();
        for (raw_id, subjects) in seed {
            let test_id = TestId::parse(&raw_id).map_err(|e| PayloadError::SeedTestId {
                raw: raw_id.clone(),
                reason: e.to_string(),
            })?;
            store.insert(test_id, subjects);
        }
        Ok(store)
    }

    /// Replaces all records for `test_id`.
    pub fn insert<I, S>(&self, test_id: TestId, records: I)
    where
        I: IntoIterator<Item = (S, SubjectRecord)>,
        S: Into<String>,
    {
        let records = records
            .into_iter()
            .map(|(subject, record)| (subject.into(), record))
            .collect();
        self.tests.write().insert(test_id, records);
    }

    /// Drops all records for `test_id`.
    pub fn remove(&self, test_id: &TestId) -> bool {
        self.tests.write().remove(test_id).is_some()
    }

    /// Number of tests with data.
    pub fn len(&self) -> usize {
        self.tests.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.read().is_empty()
    }
}

impl SubjectSource for InMemorySubjectSource {
    async fn fetch(&self, test_id: &TestId) -> PayloadResult<Option<Vec<(String, SubjectRecord)>>> {
        Ok(self.tests.read().get(test_id).cloned())
    }
}

impl<T: SubjectSource> SubjectSource for std::sync::Arc<T> {
    async fn fetch(&self, test_id: &TestId) -> PayloadResult<Option<Vec<(String, SubjectRecord)>>> {
        (**self).fetch(test_id).await
    }
}
