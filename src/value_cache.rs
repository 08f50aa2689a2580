//! Per-widget scratch storage that survives between frames.

use log::trace;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Frames an entry may go unused before it is dropped
pub const DEFAULT_EXPIRE_FRAMES: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    id: egui::Id,
    type_id: TypeId,
}

impl CacheKey {
    fn of<T: 'static>(id: egui::Id) -> Self {
        Self {
            id,
            type_id: TypeId::of::<T>(),
        }
    }
}

struct CacheEntry {
    value: Box<dyn Any>,
    last_used: u64,
}

/// Values keyed by widget id and value type.
///
/// Entries not touched for `expire_frames` frames are removed by [`ValueCache::expire`].
pub struct ValueCache {
    entries: HashMap<CacheKey, CacheEntry>,
    expire_frames: u64,
}

impl ValueCache {
    pub fn new(expire_frames: u64) -> Self {
        Self {
            entries: HashMap::new(),
            expire_frames,
        }
    }

    pub fn expire_frames(&self) -> u64 {
        self.expire_frames
    }

    pub fn contains<T: 'static>(&self, id: egui::Id) -> bool {
        self.entries.contains_key(&CacheKey::of::<T>(id))
    }

    /// Borrow a cached value without touching its timestamp
    pub fn peek<T: 'static>(&self, id: egui::Id) -> Option<&T> {
        self.entries
            .get(&CacheKey::of::<T>(id))?
            .value
            .downcast_ref()
    }

    /// Store a value, stamping it as used in `frame`
    pub fn insert<T: 'static>(&mut self, id: egui::Id, frame: u64, value: Box<T>) {
        self.entries.insert(
            CacheKey::of::<T>(id),
            CacheEntry {
                value,
                last_used: frame,
            },
        );
    }

    /// Take a value out of the cache
    pub fn detach<T: 'static>(&mut self, id: egui::Id) -> Option<Box<T>> {
        let entry = self.entries.remove(&CacheKey::of::<T>(id))?;
        entry.value.downcast().ok()
    }

    pub fn remove<T: 'static>(&mut self, id: egui::Id) -> bool {
        self.entries.remove(&CacheKey::of::<T>(id)).is_some()
    }

    /// Drop entries last used more than `expire_frames` frames before `frame`
    pub fn expire(&mut self, frame: u64) {
        let expire_frames = self.expire_frames;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| frame.saturating_sub(entry.last_used) <= expire_frames);
        let expired = before - self.entries.len();
        if expired > 0 {
            trace!("expired {} cached values at frame {}", expired, frame);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ValueCache {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRE_FRAMES)
    }
}

impl fmt::Debug for ValueCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCache")
            .field("entries", &self.entries.len())
            .field("expire_frames", &self.expire_frames)
            .finish()
    }
}
