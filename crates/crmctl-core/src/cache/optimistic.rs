// ── Optimistic two-phase mutation ──
//
// Apply a local patch, run the remote call, and restore the patch if the
// remote call fails. The rollback always lands before the error is
// returned to the caller.

use std::future::Future;

use tracing::warn;

use super::query_cache::{PatchUndo, QueryCache};
use crate::error::CoreError;

/// Run `remote` with `apply`'s patch visible in `cache` for its duration.
pub async fn optimistic<A, Fut, T>(cache: &QueryCache, apply: A, remote: Fut) -> Result<T, CoreError>
where
    A: FnOnce(&QueryCache) -> PatchUndo,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let undo = apply(cache);
    match remote.await {
        Ok(value) => Ok(value),
        Err(err) => {
            let touched = undo.len();
            let restored = cache.rollback(undo);
            warn!(error = %err, touched, restored, "remote call failed, optimistic patch reverted");
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::cache::{QueryKey, Revert};
    use crmctl_api::ListQuery;

    async fn seeded() -> (QueryCache, QueryKey) {
        let cache = QueryCache::new();
        let key = QueryKey::list("contact", &ListQuery::new());
        cache
            .fetch(key.clone(), "Contact", || async {
                Ok(json!({ "items": [{ "id": "c1" }, { "id": "c2" }], "total": 2, "currentPage": 1 }))
            })
            .await
            .unwrap();
        (cache, key)
    }

    fn clear(_: &Value) -> Option<(Value, Revert)> {
        let revert: Revert = Box::new(|_| None);
        Some((json!({ "items": [], "total": 0, "currentPage": 1 }), revert))
    }

    #[tokio::test]
    async fn success_keeps_patch() {
        let (cache, key) = seeded().await;
        let out = optimistic(&cache, |c| c.patch_lists("contact", clear), async { Ok(5) })
            .await
            .unwrap();
        assert_eq!(out, 5);
        assert_eq!(cache.peek(&key).unwrap().data["total"], 0);
    }

    #[tokio::test]
    async fn failure_restores_before_returning() {
        let (cache, key) = seeded().await;
        let before = cache.peek(&key).unwrap().data;

        let err = optimistic(&cache, |c| c.patch_lists("contact", clear), async {
            Err::<(), _>(CoreError::Api {
                message: "locked".into(),
                status: Some(409),
            })
        })
        .await
        .unwrap_err();

        assert_eq!(err.status(), Some(409));
        assert_eq!(cache.peek(&key).unwrap().data, before);
    }
}
