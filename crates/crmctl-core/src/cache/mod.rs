// ── Query cache ──
//
// Tag bookkeeping, the shared query cache, and the optimistic-patch
// combinator built on it.

mod optimistic;
mod query_cache;
mod tag;

pub use optimistic::optimistic;
pub use query_cache::{CachedValue, PatchUndo, QueryCache, Revert};
pub use tag::{QueryKey, QueryKind, Tag, TagId};
