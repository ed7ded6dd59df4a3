//! Single-slot vocabulary cache for front ends that serve many requests.
//!
//! Building a vocabulary means re-reading a corpus, so a front end keeps the
//! last one it built. The slot is keyed by the source path and the filter
//! configuration; asking for a different key rebuilds and replaces it.
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::VocabularyError;
use super::{build_from_path, Vocabulary, VocabularyConfig};

/// Parameters a cached vocabulary was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyKey {
    /// corpus or vocabulary file
    pub source: PathBuf,
    /// filter applied to the counted tokens
    pub config: VocabularyConfig,
}

impl VocabularyKey {
    /// creates a key
    pub fn new<P: Into<PathBuf>>(source: P, config: VocabularyConfig) -> VocabularyKey {
        VocabularyKey {
            source: source.into(),
            config,
        }
    }
}

/// Holds the most recently built vocabulary.
///
/// The lock is held while building, so concurrent callers with the same key
/// wait for a single build and then share its result.
#[derive(Debug, Default)]
pub struct VocabularyCache {
    slot: Mutex<Option<(VocabularyKey, Arc<Vocabulary>)>>,
}

impl VocabularyCache {
    /// Creates an empty cache.
    pub fn new() -> VocabularyCache {
        VocabularyCache::default()
    }

    /// Returns the cached vocabulary for `key`, building it with `build` if
    /// the slot is empty or holds another key.
    pub fn get_or_build<F>(&self, key: &VocabularyKey, build: F) -> Result<Arc<Vocabulary>, VocabularyError>
    where
        F: FnOnce(&VocabularyKey) -> Result<Vocabulary, VocabularyError>,
    {
        let mut slot = self.slot.lock();

        if let Some((cached_key, vocabulary)) = slot.as_ref() {
            if cached_key == key {
                log::trace!("Vocabulary cache hit for {}", key.source.display());
                return Ok(Arc::clone(vocabulary));
            }
            log::debug!(
                "Vocabulary parameters changed, rebuilding from {}",
                key.source.display()
            );
        }

        let vocabulary = Arc::new(build(key)?);
        *slot = Some((key.clone(), Arc::clone(&vocabulary)));
        Ok(vocabulary)
    }

    /// Returns the vocabulary for `key`, reading it from disk on a miss.
    pub fn load(&self, key: &VocabularyKey) -> Result<Arc<Vocabulary>, VocabularyError> {
        self.get_or_build(key, |key| {
            build_from_path(&key.source, &key.config).map(|(vocabulary, _)| vocabulary)
        })
    }

    /// Key of the cached vocabulary, if any.
    pub fn current_key(&self) -> Option<VocabularyKey> {
        self.slot.lock().as_ref().map(|(key, _)| key.clone())
    }

    /// Drops the cached vocabulary.
    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn build_counting(calls: &Cell<usize>) -> impl Fn(&VocabularyKey) -> Result<Vocabulary, VocabularyError> + '_ {
        move |_| {
            calls.set(calls.get() + 1);
            Vocabulary::from_entries(vec![("çay", 10)])
        }
    }

    #[test]
    fn reuses_until_key_changes() {
        let cache = VocabularyCache::new();
        let calls = Cell::new(0);
        let key = VocabularyKey::new("corpus.csv", VocabularyConfig::default());

        let first = cache.get_or_build(&key, build_counting(&calls)).unwrap();
        let second = cache.get_or_build(&key, build_counting(&calls)).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        let other = VocabularyKey::new(
            "corpus.csv",
            VocabularyConfig {
                min_frequency: 5,
                ..VocabularyConfig::default()
            },
        );
        let third = cache.get_or_build(&other, build_counting(&calls)).unwrap();
        assert_eq!(calls.get(), 2);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.current_key(), Some(other));

        cache.invalidate();
        assert_eq!(cache.current_key(), None);
    }

    #[test]
    fn failed_build_keeps_previous() {
        let cache = VocabularyCache::new();
        let key = VocabularyKey::new("a.tsv", VocabularyConfig::default());
        cache
            .get_or_build(&key, |_| Vocabulary::from_entries(vec![("çay", 1)]))
            .unwrap();

        let missing = VocabularyKey::new("/nonexistent/b.tsv", VocabularyConfig::default());
        assert!(cache.load(&missing).is_err());
        assert_eq!(cache.current_key(), Some(key));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.tsv");
        std::fs::write(&path, "çay\t10\ncay\t1\nkitab\t3\n").unwrap();

        let cache = VocabularyCache::new();
        let config = VocabularyConfig {
            min_frequency: 2,
            ..VocabularyConfig::default()
        };
        let vocabulary = cache.load(&VocabularyKey::new(&path, config)).unwrap();
        assert_eq!(vocabulary.iter().collect::<Vec<_>>(), vec![("kitab", 3), ("çay", 10)]);
    }
}
