//! Result cache for producer-step invocations.
//!
//! Memoizes the last successful output of a step for a given input file,
//! keyed by (step identity, input relative path) and guarded by a content
//! fingerprint. Entries are independent, so concurrent producers need no
//! cache-wide lock — dashmap gives per-key atomicity.
//!
//! `Once` steps have no input file; their entries sit in a separate map and
//! are conservatively dropped whenever *any* watched file changes, since a
//! global step may have read anything out of the content store.
//!
//! Lifetime: one watch session. Purely in-memory; the cache dies with the
//! process.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use crate::freshness::Fingerprint;
use crate::step::StepOutput;

/// Cached result of one step invocation.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Fingerprint of the input at the time the result was computed.
    pub fingerprint: Fingerprint,
    /// The step result.
    pub output: StepOutput,
    /// Output-relative paths this result was written to.
    pub outputs: Vec<PathBuf>,
}

/// Memoization table for producer steps, shared across build passes.
#[derive(Default)]
pub struct StepCache {
    /// (step name, input relative path) -> entry
    files: DashMap<(String, PathBuf), CacheEntry>,
    /// step name -> entry, for `Once` steps
    once: DashMap<String, CacheEntry>,
}

impl StepCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a per-file entry; fingerprint mismatch reads as absent.
    pub fn get(&self, step: &str, rel: &Path, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        if fingerprint.is_missing() {
            return None;
        }
        let key = (step.to_string(), rel.to_path_buf());
        let entry = self.files.get(&key)?;
        if entry.fingerprint == *fingerprint {
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Store a per-file entry, replacing any previous result.
    pub fn put(&self, step: &str, rel: &Path, entry: CacheEntry) {
        self.files.insert((step.to_string(), rel.to_path_buf()), entry);
    }

    /// Look up a `Once`-step entry. Valid until the next invalidation.
    pub fn get_once(&self, step: &str) -> Option<CacheEntry> {
        self.once.get(step).map(|entry| entry.clone())
    }

    /// Store a `Once`-step entry.
    pub fn put_once(&self, step: &str, entry: CacheEntry) {
        self.once.insert(step.to_string(), entry);
    }

    /// Invalidate everything attributable to one input path, plus every
    /// `Once` entry (global steps may depend on any file).
    pub fn invalidate(&self, rel: &Path) {
        self.files.retain(|(_, path), _| path != rel);
        self.once.clear();
    }

    /// Number of live per-file entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.once.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::{ContentHash, Fingerprint};

    fn hash_fp(byte: u8) -> Fingerprint {
        Fingerprint::Hash(ContentHash::new([byte; 32]))
    }

    fn entry(byte: u8) -> CacheEntry {
        CacheEntry {
            fingerprint: hash_fp(byte),
            output: StepOutput::Text("cached".into()),
            outputs: vec![PathBuf::from("a.html")],
        }
    }

    #[test]
    fn test_hit_on_matching_fingerprint() {
        let cache = StepCache::new();
        cache.put("render", Path::new("a.md"), entry(1));

        let hit = cache.get("render", Path::new("a.md"), &hash_fp(1));
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().output, StepOutput::Text("cached".into()));
    }

    #[test]
    fn test_miss_on_stale_fingerprint() {
        let cache = StepCache::new();
        cache.put("render", Path::new("a.md"), entry(1));

        assert!(cache.get("render", Path::new("a.md"), &hash_fp(2)).is_none());
    }

    #[test]
    fn test_miss_on_missing_fingerprint() {
        let cache = StepCache::new();
        cache.put("render", Path::new("a.md"), entry(1));

        assert!(
            cache
                .get("render", Path::new("a.md"), &Fingerprint::Missing)
                .is_none()
        );
    }

    #[test]
    fn test_keys_isolated_by_step_and_path() {
        let cache = StepCache::new();
        cache.put("render", Path::new("a.md"), entry(1));

        assert!(cache.get("minify", Path::new("a.md"), &hash_fp(1)).is_none());
        assert!(cache.get("render", Path::new("b.md"), &hash_fp(1)).is_none());
    }

    #[test]
    fn test_invalidate_removes_all_steps_for_path() {
        let cache = StepCache::new();
        cache.put("render", Path::new("a.md"), entry(1));
        cache.put("minify", Path::new("a.md"), entry(1));
        cache.put("render", Path::new("b.md"), entry(1));

        cache.invalidate(Path::new("a.md"));

        assert!(cache.get("render", Path::new("a.md"), &hash_fp(1)).is_none());
        assert!(cache.get("minify", Path::new("a.md"), &hash_fp(1)).is_none());
        assert!(cache.get("render", Path::new("b.md"), &hash_fp(1)).is_some());
    }

    #[test]
    fn test_invalidate_clears_once_entries() {
        let cache = StepCache::new();
        cache.put_once("feed", entry(1));
        assert!(cache.get_once("feed").is_some());

        // Any path invalidation drops global-step results.
        cache.invalidate(Path::new("unrelated.md"));
        assert!(cache.get_once("feed").is_none());
    }
}
