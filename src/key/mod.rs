//! Test identifiers and cache-key derivation.
//!
//! A [`TestId`] is the canonical form of an assessment identifier. [`cache_key`] maps it
//! to the [`CacheKey`] the store is addressed by.

use std::fmt;

use thiserror::Error;

/// Reasons a raw identifier cannot become a [`TestId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTestId {
    /// Identifier was empty after trimming.
    #[error("test id must not be empty")]
    Empty,

    /// Identifier contains whitespace or control characters.
    #[error("test id '{value}' contains whitespace or control characters")]
    IllegalCharacter { value: String },
}

/// Canonical assessment identifier.
///
/// Strings are trimmed; integers render in decimal, so `TestId::from(42)` and
/// `TestId::parse("42")` name the same test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestId(String);

impl TestId {
    /// Canonicalizes `raw` into a test id.
    pub fn parse(raw: &str) -> Result<Self, InvalidTestId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidTestId::Empty);
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(InvalidTestId::IllegalCharacter {
                value: trimmed.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for TestId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl std::str::FromStr for TestId {
    type Err = InvalidTestId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store key for one test's scoring result. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the cache key for `test_id`.
///
/// The key is the canonical id string itself: the mapping is total (every `TestId`
/// has a key), injective (distinct ids never share a key) and stable across
/// processes, so entries written by one gateway instance are found by any other.
#[inline]
pub fn cache_key(test_id: &TestId) -> CacheKey {
    CacheKey(test_id.0.clone())
}
