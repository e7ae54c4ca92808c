// ── Tag-indexed query cache ──
//
// One shared cache per console. Entries are keyed by `QueryKey` and carry
// the tags their data provides; invalidating a tag marks every entry that
// provides it stale. Each entry is replaced as a whole under its shard
// lock, so a concurrent reader sees either the old or the new value.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use super::tag::{QueryKind, QueryKey, Tag};
use crate::error::CoreError;

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Value>, CoreError>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<Value>,
    tags: Vec<Tag>,
    stale: bool,
    /// Id of the fetch that stored `data`; patches keep it.
    fetched: u64,
}

struct InFlight {
    id: u64,
    tag_type: String,
    /// Invalidation epoch of `tag_type` when the request started.
    epoch: u64,
    fut: SharedFetch,
}

/// A cached value and whether it has been invalidated since it was stored.
#[derive(Debug, Clone)]
pub struct CachedValue {
    pub data: Arc<Value>,
    pub stale: bool,
}

/// Takes one patch back out of an entry that changed after it was applied.
///
/// Returns `None` when there is nothing left to undo.
pub type Revert = Box<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Prior values captured by [`QueryCache::patch_lists`].
#[derive(Default)]
#[must_use = "an unused undo can never be rolled back"]
pub struct PatchUndo {
    records: Vec<PatchRecord>,
}

struct PatchRecord {
    key: QueryKey,
    fetched: u64,
    prior: Arc<Value>,
    applied: Arc<Value>,
    revert: Revert,
}

impl std::fmt::Debug for PatchUndo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.records.iter().map(|r| r.key.to_string()).collect();
        f.debug_struct("PatchUndo").field("entries", &keys).finish()
    }
}

impl PatchUndo {
    /// Number of entries the patch touched.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The console-wide query cache.
pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    in_flight: DashMap<QueryKey, InFlight>,
    /// Per tag type, bumped on every invalidation touching the type.
    epochs: DashMap<String, u64>,
    next_fetch: AtomicU64,
    version: watch::Sender<u64>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            epochs: DashMap::new(),
            next_fetch: AtomicU64::new(0),
            version,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Return the cached value for `key`, loading it when absent or stale.
    ///
    /// Concurrent calls for the same key share one pending request. The
    /// loader only runs on a miss; a failed load stores nothing.
    pub async fn fetch<F, Fut>(
        &self,
        key: QueryKey,
        tag_type: &str,
        loader: F,
    ) -> Result<Arc<Value>, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, CoreError>> + Send + 'static,
    {
        if let Some(entry) = self.entries.get(&key) {
            if !entry.stale {
                trace!(%key, "cache hit");
                return Ok(Arc::clone(&entry.data));
            }
        }

        let (id, epoch, fut) = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(pending) => {
                trace!(%key, "joining in-flight request");
                let pending = pending.get();
                (pending.id, pending.epoch, pending.fut.clone())
            }
            Entry::Vacant(slot) => {
                trace!(%key, "cache miss");
                let id = self.next_fetch.fetch_add(1, Ordering::Relaxed);
                let epoch = self.epoch(tag_type);
                let fut = loader().map(|res| res.map(Arc::new)).boxed().shared();
                slot.insert(InFlight {
                    id,
                    tag_type: tag_type.to_owned(),
                    epoch,
                    fut: fut.clone(),
                });
                (id, epoch, fut)
            }
        };

        let result = fut.await;
        self.settle(&key, tag_type, id, epoch, &result);
        result
    }

    /// Store a finished request, unless it was superseded by an
    /// invalidation or a reset while it was running.
    fn settle(
        &self,
        key: &QueryKey,
        tag_type: &str,
        id: u64,
        epoch: u64,
        result: &Result<Arc<Value>, CoreError>,
    ) {
        let ours = self.in_flight.get(key).is_some_and(|f| f.id == id);
        if ours {
            if let Ok(data) = result {
                let tags = match &key.kind {
                    QueryKind::List(_) => Tag::for_page(tag_type, data),
                    QueryKind::Get(entity) => vec![Tag::id(tag_type, entity.clone())],
                };
                self.entries.insert(
                    key.clone(),
                    CacheEntry {
                        data: Arc::clone(data),
                        tags,
                        stale: false,
                        fetched: id,
                    },
                );
                // An invalidation may have raced the insert.
                if self.epoch(tag_type) != epoch {
                    if let Some(mut entry) = self.entries.get_mut(key) {
                        entry.stale = true;
                    }
                }
                self.bump();
            }
        }
        self.in_flight.remove_if(key, |_, f| f.id == id);
    }

    /// Current value for `key` without loading.
    pub fn peek(&self, key: &QueryKey) -> Option<CachedValue> {
        self.entries.get(key).map(|entry| CachedValue {
            data: Arc::clone(&entry.data),
            stale: entry.stale,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Version counter bumped on every write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Mark every entry providing any of `tags` as stale.
    ///
    /// Requests of the affected types that are still running are
    /// detached: their callers get the response, the cache does not.
    /// Returns the number of entries newly marked.
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        let types: BTreeSet<&str> = tags.iter().map(|t| t.tag_type.as_str()).collect();
        for tag_type in &types {
            *self.epochs.entry((*tag_type).to_owned()).or_insert(0) += 1;
        }

        let mut marked = 0;
        for mut entry in self.entries.iter_mut() {
            if !entry.stale && entry.tags.iter().any(|t| tags.contains(t)) {
                entry.stale = true;
                marked += 1;
            }
        }
        self.in_flight
            .retain(|_, pending| !types.contains(pending.tag_type.as_str()));

        let rendered: Vec<String> = tags.iter().map(ToString::to_string).collect();
        debug!(tags = ?rendered, marked, "invalidated cache tags");
        self.bump();
        marked
    }

    /// Apply `patch` to every cached list of `resource`.
    ///
    /// `patch` returns `None` to leave an entry untouched, otherwise the
    /// patched value and its [`Revert`]. Each touched entry's prior value
    /// is kept in the returned undo.
    pub fn patch_lists<F>(&self, resource: &str, patch: F) -> PatchUndo
    where
        F: Fn(&Value) -> Option<(Value, Revert)>,
    {
        let mut undo = PatchUndo::default();
        for mut entry in self.entries.iter_mut() {
            let (key, cached) = entry.pair_mut();
            if key.resource != resource || !key.is_list() {
                continue;
            }
            if let Some((next, revert)) = patch(&cached.data) {
                let applied = Arc::new(next);
                let prior = std::mem::replace(&mut cached.data, Arc::clone(&applied));
                undo.records.push(PatchRecord {
                    key: key.clone(),
                    fetched: cached.fetched,
                    prior,
                    applied,
                    revert,
                });
            }
        }
        if !undo.is_empty() {
            trace!(resource, entries = undo.len(), "patched cached lists");
            self.bump();
        }
        undo
    }

    /// Restore every entry captured in `undo`.
    ///
    /// An untouched entry gets its prior value back. An entry patched again
    /// since has only this patch reverted, so later patches survive. An
    /// entry that was refetched or dropped is left alone. Returns the number
    /// of entries restored.
    pub fn rollback(&self, undo: PatchUndo) -> usize {
        let mut restored = 0;
        for record in undo.records {
            let Some(mut entry) = self.entries.get_mut(&record.key) else {
                continue;
            };
            if entry.fetched != record.fetched {
                continue;
            }
            if Arc::ptr_eq(&entry.data, &record.applied) {
                entry.data = record.prior;
                restored += 1;
            } else if let Some(next) = (record.revert)(&entry.data) {
                entry.data = Arc::new(next);
                restored += 1;
            }
        }
        if restored > 0 {
            warn!(restored, "rolled back optimistic cache patch");
            self.bump();
        }
        restored
    }

    /// Drop one entry.
    pub fn evict(&self, key: &QueryKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.bump();
        }
        removed
    }

    /// Drop everything, including requests still running.
    pub fn reset(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.in_flight.clear();
        debug!(dropped, "query cache reset");
        self.bump();
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn epoch(&self, tag_type: &str) -> u64 {
        self.epochs.get(tag_type).map_or(0, |e| *e)
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
