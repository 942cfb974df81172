//! Compiled pattern cache.
//!
//! Parsed messages are cached per `(locale, key, template hash)` under a
//! strict LRU policy. Including the template hash means an edited template
//! never hits a stale entry even before its locale is invalidated.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use const_fnv1a_hash::fnv1a_hash_str_64;
use lru::LruCache;
use tracing::debug;

use crate::parser::{Message, ParseError, parse_message};
use crate::types::LocaleId;

/// Statistics for the pattern cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of lookups served from the cache.
    pub hits: u64,
    /// Number of lookups that had to parse.
    pub misses: u64,
    /// Number of templates parsed successfully and stored.
    pub compiles: u64,
    /// Current number of entries.
    pub size: usize,
    /// Maximum number of entries.
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate as a fraction (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    locale: LocaleId,
    key: String,
    template_hash: u64,
}

#[derive(Debug, Clone)]
struct CachedPattern {
    message: Arc<Message>,
    #[cfg_attr(not(test), expect(dead_code))]
    compiled_at: Instant,
}

/// Thread-safe LRU cache of parsed messages.
pub struct PatternCache {
    entries: Mutex<LruCache<CacheKey, CachedPattern>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    compiles: AtomicU64,
}

impl PatternCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            compiles: AtomicU64::new(0),
        }
    }

    /// Return the parsed message for a template, parsing it on a miss.
    ///
    /// The cache lock is held while parsing, so concurrent callers never
    /// compile the same coordinate twice. Parse failures are not cached.
    pub fn get_or_compile(
        &self,
        locale: &LocaleId,
        key: &str,
        template: &str,
    ) -> Result<Arc<Message>, ParseError> {
        let cache_key = CacheKey {
            locale: locale.clone(),
            key: key.to_string(),
            template_hash: fnv1a_hash_str_64(template),
        };

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = entries.get(&cache_key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(&cached.message));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(locale = %locale, key, "compiling message template");
        let message = Arc::new(parse_message(template)?);
        self.compiles.fetch_add(1, Ordering::Relaxed);
        entries.put(
            cache_key,
            CachedPattern {
                message: Arc::clone(&message),
                compiled_at: Instant::now(),
            },
        );
        Ok(message)
    }

    /// Drop every entry for one locale. Returns the number removed.
    pub fn invalidate(&self, locale: &LocaleId) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let stale: Vec<CacheKey> = entries
            .iter()
            .filter(|(key, _)| &key.locale == locale)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        debug!(locale = %locale, removed = stale.len(), "invalidated cached patterns");
        stale.len()
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let size = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compiles: self.compiles.load(Ordering::Relaxed),
            size,
            capacity: self.capacity,
        }
    }

    #[cfg(test)]
    fn compiled_at(&self, locale: &LocaleId, key: &str, template: &str) -> Option<Instant> {
        let cache_key = CacheKey {
            locale: locale.clone(),
            key: key.to_string(),
            template_hash: fnv1a_hash_str_64(template),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .peek(&cache_key)
            .map(|cached| cached.compiled_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(tag: &str) -> LocaleId {
        LocaleId::parse(tag).unwrap()
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = PatternCache::new(8);
        let en = locale("en");
        let first = cache.get_or_compile(&en, "greeting", "Hello {name}").unwrap();
        let second = cache.get_or_compile(&en, "greeting", "Hello {name}").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.compiles, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!(cache.compiled_at(&en, "greeting", "Hello {name}").is_some());
    }

    #[test]
    fn changed_template_misses() {
        let cache = PatternCache::new(8);
        let en = locale("en");
        cache.get_or_compile(&en, "k", "one").unwrap();
        cache.get_or_compile(&en, "k", "two").unwrap();
        assert_eq!(cache.stats().compiles, 2);
    }

    #[test]
    fn parse_failures_are_not_cached() {
        let cache = PatternCache::new(8);
        let en = locale("en");
        assert!(cache.get_or_compile(&en, "bad", "{n, plural, one{x}}").is_err());
        assert!(cache.get_or_compile(&en, "bad", "{n, plural, one{x}}").is_err());
        let stats = cache.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.compiles, 0);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn invalidate_only_touches_one_locale() {
        let cache = PatternCache::new(8);
        let (en, fr) = (locale("en"), locale("fr"));
        cache.get_or_compile(&en, "a", "A").unwrap();
        cache.get_or_compile(&en, "b", "B").unwrap();
        cache.get_or_compile(&fr, "a", "Á").unwrap();

        assert_eq!(cache.invalidate(&en), 2);
        assert_eq!(cache.stats().size, 1);
        cache.get_or_compile(&fr, "a", "Á").unwrap();
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let cache = PatternCache::new(2);
        let en = locale("en");
        cache.get_or_compile(&en, "a", "A").unwrap();
        cache.get_or_compile(&en, "b", "B").unwrap();
        // refresh "a" so "b" becomes the eviction candidate
        cache.get_or_compile(&en, "a", "A").unwrap();
        cache.get_or_compile(&en, "c", "C").unwrap();

        assert!(cache.compiled_at(&en, "a", "A").is_some());
        assert!(cache.compiled_at(&en, "b", "B").is_none());
        assert_eq!(cache.stats().size, 2);
    }
}
