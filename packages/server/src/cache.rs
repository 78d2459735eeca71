use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use uuid::Uuid;

use crate::models::course::CourseDetailResponse;

/// Storage for rendered course views.
///
/// Mutations call [`ViewStore::invalidate_path`] after they succeed, so the
/// next read of that view goes back to the database.
///
/// Readers take a [`ViewStore::generation`] before loading from the store and
/// hand it back to [`ViewStore::put`]. A view whose generation is older than
/// the latest invalidation is dropped instead of cached.
pub trait ViewStore: Send + Sync {
    fn get(&self, path: &str) -> Option<CourseDetailResponse>;
    fn generation(&self, path: &str) -> u64;
    fn put(&self, path: String, view: CourseDetailResponse, generation: u64);
    fn invalidate_path(&self, path: &str);
}

/// View path of a course's edit page.
pub fn course_view_path(course_id: Uuid) -> String {
    format!("/courses/{course_id}")
}

struct Views {
    entries: LruCache<String, CourseDetailResponse>,
    /// Bumped by every invalidation, whatever the path.
    generation: u64,
}

/// LRU cache of rendered course detail views, keyed by view path.
///
/// A capacity of zero disables caching: lookups always miss and inserts
/// are dropped.
pub struct ViewCache {
    inner: Option<Mutex<Views>>,
}

impl ViewCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| {
                Mutex::new(Views {
                    entries: LruCache::new(cap),
                    generation: 0,
                })
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .as_ref()
            .and_then(|m| m.lock().ok())
            .map_or(0, |views| views.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ViewStore for ViewCache {
    fn get(&self, path: &str) -> Option<CourseDetailResponse> {
        let mut views = self.inner.as_ref()?.lock().ok()?;
        views.entries.get(path).cloned()
    }

    fn generation(&self, _path: &str) -> u64 {
        self.inner
            .as_ref()
            .and_then(|m| m.lock().ok())
            .map_or(0, |views| views.generation)
    }

    fn put(&self, path: String, view: CourseDetailResponse, generation: u64) {
        let Some(mut views) = self.inner.as_ref().and_then(|m| m.lock().ok()) else {
            return;
        };
        if views.generation != generation {
            tracing::debug!(path, "Dropped view read before an invalidation");
            return;
        }
        views.entries.put(path, view);
    }

    fn invalidate_path(&self, path: &str) {
        if let Some(mut views) = self.inner.as_ref().and_then(|m| m.lock().ok()) {
            views.generation = views.generation.wrapping_add(1);
            if views.entries.pop(path).is_some() {
                tracing::debug!(path, "Invalidated cached view");
            }
        }
    }
}
