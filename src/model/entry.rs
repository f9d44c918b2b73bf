use super::ScoringResponse;
use super::error::EntryError;

/// Serialized [`ScoringResponse`] as persisted in the store.
///
/// Entries are JSON with the scoring service's field names, so a cached value reads
/// exactly like the reply it was built from.
///
/// # Example
/// ```rust
/// use irt_cache::model::{CacheEntry, ScoringResponse};
///
/// let response = ScoringResponse { fit_error: 0.1, ..Default::default() };
/// let entry = CacheEntry::encode(&response).unwrap();
/// assert_eq!(entry.decode().unwrap(), response);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    bytes: Vec<u8>,
}

impl CacheEntry {
    pub fn encode(response: &ScoringResponse) -> Result<Self, EntryError> {
        let bytes = serde_json::to_vec(response).map_err(EntryError::Encode)?;
        Ok(Self { bytes })
    }

    /// Wraps bytes read back from the store. Nothing is checked until [`decode`](Self::decode).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parses the entry and re-checks the response invariants.
    pub fn decode(&self) -> Result<ScoringResponse, EntryError> {
        let response: ScoringResponse =
            serde_json::from_slice(&self.bytes).map_err(EntryError::Decode)?;
        response.validate()?;
        Ok(response)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
