//! Histogram buckets: named occurrence counters
//!
//! Bucket sets are expected to stay small (discrete categorical outcomes such
//! as status codes), so lookup is a linear scan by exact name.

use std::collections::VecDeque;

use crate::error::{MetricsError, MetricsResult};

/// Longest accepted bucket name, in bytes
pub const MAX_BUCKET_NAME_LEN: usize = 254;

/// One named occurrence counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    name: String,
    count: u64,
}

impl Bucket {
    /// Bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Occurrences recorded under this name
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Length-prefixed name encoding: one length byte, the name bytes, then a
    /// trailing NUL
    pub fn encoded_name(&self) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(self.name.len() + 2);
        // Names are capped at MAX_BUCKET_NAME_LEN on insertion
        encoded.push(u8::try_from(self.name.len()).unwrap_or(u8::MAX));
        encoded.extend_from_slice(self.name.as_bytes());
        encoded.push(0);
        encoded
    }
}

/// Set of uniquely named buckets plus the total across them
///
/// Iteration order is newest-first, the order buckets were prepended in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketStore {
    buckets: VecDeque<Bucket>,
    total_count: u64,
}

impl BucketStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `name`
    ///
    /// A new name is prepended as a bucket with count 1. `max_buckets`
    /// bounds how many distinct names the store accepts.
    ///
    /// # Errors
    /// Returns [`MetricsError::CapacityExhausted`] or
    /// [`MetricsError::Allocation`] when a new bucket cannot be added; the
    /// store is unchanged in that case.
    ///
    /// # Panics
    /// Panics when `name` is longer than [`MAX_BUCKET_NAME_LEN`] bytes.
    pub fn bump(&mut self, name: &str, max_buckets: Option<usize>) -> MetricsResult<()> {
        assert!(
            name.len() <= MAX_BUCKET_NAME_LEN,
            "bucket name must be at most {MAX_BUCKET_NAME_LEN} bytes, got {}",
            name.len()
        );

        if let Some(bucket) = self.buckets.iter_mut().find(|b| b.name == name) {
            bucket.count += 1;
            self.total_count += 1;
            return Ok(());
        }

        if let Some(limit) = max_buckets {
            if self.buckets.len() >= limit {
                return Err(MetricsError::CapacityExhausted { resource: "bucket", limit });
            }
        }

        let mut owned = String::new();
        owned.try_reserve_exact(name.len()).map_err(MetricsError::allocation("bucket"))?;
        owned.push_str(name);
        self.buckets.try_reserve(1).map_err(MetricsError::allocation("bucket"))?;

        self.buckets.push_front(Bucket { name: owned, count: 1 });
        self.total_count += 1;
        Ok(())
    }

    /// Occurrences recorded under `name`, if the bucket exists
    pub fn get(&self, name: &str) -> Option<u64> {
        self.buckets.iter().find(|b| b.name == name).map(Bucket::count)
    }

    /// Buckets in chain order (newest first)
    pub fn iter(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.buckets.iter()
    }

    /// Number of distinct bucket names
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no bucket exists
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Occurrences across every bucket
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Drop every bucket and zero the total
    pub fn reset(&mut self) {
        self.buckets.clear();
        self.total_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Validates repeated and distinct bumps.
    ///
    /// Assertions:
    /// - Confirms each name appears once with its call count.
    /// - Confirms the total equals the number of calls.
    #[test]
    fn test_bump_counts_per_name() {
        let mut store = BucketStore::new();
        for name in ["200", "200", "404", "200"] {
            store.bump(name, None).expect("bump");
        }

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("200"), Some(3));
        assert_eq!(store.get("404"), Some(1));
        assert_eq!(store.get("500"), None);
        assert_eq!(store.total_count(), 4);
    }

    #[test]
    fn test_new_buckets_are_prepended() {
        let mut store = BucketStore::new();
        store.bump("a", None).expect("bump");
        store.bump("b", None).expect("bump");
        store.bump("a", None).expect("bump");

        let names: Vec<&str> = store.iter().map(Bucket::name).collect();
        assert_eq!(names, ["b", "a"]);
    }

    /// Validates that lookup is exact, including prefixes and case.
    ///
    /// Assertions:
    /// - Confirms near-miss names get their own buckets.
    #[test]
    fn test_exact_name_match() {
        let mut store = BucketStore::new();
        for name in ["ok", "ok ", "OK", "o"] {
            store.bump(name, None).expect("bump");
        }
        assert_eq!(store.len(), 4);
        assert!(store.iter().all(|b| b.count() == 1));
    }

    /// Validates histogram bookkeeping against a reference map.
    ///
    /// Assertions:
    /// - Confirms uniqueness, per-name counts and total.
    #[test]
    fn test_matches_reference_counts() {
        let mut store = BucketStore::new();
        let mut reference: HashMap<String, u64> = HashMap::new();

        for i in 0..300u32 {
            let name = format!("k{}", (i * 7) % 13);
            store.bump(&name, None).expect("bump");
            *reference.entry(name).or_default() += 1;
        }

        assert_eq!(store.len(), reference.len());
        assert_eq!(store.total_count(), 300);
        for (name, count) in &reference {
            assert_eq!(store.get(name), Some(*count), "bucket {name}");
        }
    }

    /// Validates that the bucket limit leaves the store untouched.
    ///
    /// Assertions:
    /// - Confirms the error names the limit.
    /// - Confirms existing buckets still accept bumps.
    #[test]
    fn test_bucket_limit() {
        let mut store = BucketStore::new();
        store.bump("a", Some(1)).expect("first bucket");

        let err = store.bump("b", Some(1)).unwrap_err();
        assert_eq!(err, MetricsError::CapacityExhausted { resource: "bucket", limit: 1 });
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_count(), 1);

        store.bump("a", Some(1)).expect("existing bucket");
        assert_eq!(store.get("a"), Some(2));
    }

    #[test]
    fn test_longest_name_accepted() {
        let mut store = BucketStore::new();
        let name = "x".repeat(MAX_BUCKET_NAME_LEN);
        store.bump(&name, None).expect("254 bytes is allowed");
        assert_eq!(store.get(&name), Some(1));
    }

    #[test]
    #[should_panic(expected = "bucket name must be at most 254 bytes")]
    fn test_oversized_name_panics() {
        let mut store = BucketStore::new();
        let _ = store.bump(&"x".repeat(MAX_BUCKET_NAME_LEN + 1), None);
    }

    #[test]
    fn test_encoded_name() {
        let mut store = BucketStore::new();
        store.bump("404", None).expect("bump");
        let bucket = store.iter().next().expect("bucket");
        assert_eq!(bucket.encoded_name(), vec![3, b'4', b'0', b'4', 0]);
    }

    #[test]
    fn test_reset() {
        let mut store = BucketStore::new();
        store.bump("a", None).expect("bump");
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.total_count(), 0);
    }
}
