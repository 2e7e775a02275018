//! Bounded LRU cache for pattern backing pixmaps.
//!
//! tiny-skia pattern shaders borrow their backing pixmap, so the context
//! keeps the pixmaps alive here for the duration of a draw and reuses them
//! across draws until the byte budget evicts them.

use crate::pattern::Repetition;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tiny_skia::Pixmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PatternCacheKey {
    pub(crate) pattern_id: u64,
    pub(crate) repetition: Repetition,
    /// Cache dimensions (0,0 sentinel for Repeat mode).
    pub(crate) canvas_width: u32,
    pub(crate) canvas_height: u32,
}

#[derive(Debug)]
pub(crate) struct PatternPixmapCache {
    max_bytes: usize,
    total_bytes: usize,
    entries: HashMap<PatternCacheKey, Arc<Pixmap>>,
    /// Keys ordered from least to most recently used.
    recency: VecDeque<PatternCacheKey>,
}

impl PatternPixmapCache {
    pub(crate) fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            total_bytes: 0,
            entries: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.total_bytes = 0;
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    fn touch(&mut self, key: &PatternCacheKey) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(*key);
    }

    pub(crate) fn get_or_insert(
        &mut self,
        key: PatternCacheKey,
        create: impl FnOnce() -> Option<Pixmap>,
    ) -> Option<Arc<Pixmap>> {
        if let Some(existing) = self.entries.get(&key) {
            let pixmap = Arc::clone(existing);
            self.touch(&key);
            return Some(pixmap);
        }

        let pixmap = Arc::new(create()?);
        let size_bytes = pixmap.data().len();

        // An oversize pixmap is handed to the caller without pinning it.
        if size_bytes > self.max_bytes {
            return Some(pixmap);
        }

        self.total_bytes += size_bytes;
        self.entries.insert(key, Arc::clone(&pixmap));
        self.recency.push_back(key);
        self.evict_to_budget();

        Some(pixmap)
    }

    fn evict_to_budget(&mut self) {
        while self.total_bytes > self.max_bytes {
            let Some(lru_key) = self.recency.pop_front() else {
                break;
            };
            if let Some(evicted) = self.entries.remove(&lru_key) {
                self.total_bytes = self.total_bytes.saturating_sub(evicted.data().len());
            }
        }
    }
}
