// ── Generic resource operations ──
//
// `ResourceApi<T>` is the per-resource operation set: cached, tagged reads
// and invalidating writes. Records are cached as raw JSON and decoded into
// `T` on the way out, so typed and untyped handles to the same resource
// share entries.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crmctl_api::{ApiClient, Limit, ListQuery, Page, value_id};

use super::descriptor::ResourceDescriptor;
use crate::cache::{QueryCache, QueryKey, Revert, Tag, optimistic};
use crate::error::CoreError;

/// Called when any operation fails with an authentication error.
pub trait AuthFailureHook: Send + Sync {
    fn on_auth_failure(&self, err: &CoreError);
}

/// The operation set for one resource.
pub struct ResourceApi<T> {
    descriptor: ResourceDescriptor,
    client: Arc<ApiClient>,
    cache: Arc<QueryCache>,
    hook: Option<Arc<dyn AuthFailureHook>>,
    page_size: Option<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceApi<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor,
            client: Arc::clone(&self.client),
            cache: Arc::clone(&self.cache),
            hook: self.hook.clone(),
            page_size: self.page_size,
            _marker: PhantomData,
        }
    }
}

impl<T> ResourceApi<T> {
    pub fn new(descriptor: ResourceDescriptor, client: Arc<ApiClient>, cache: Arc<QueryCache>) -> Self {
        Self {
            descriptor,
            client,
            cache,
            hook: None,
            page_size: None,
            _marker: PhantomData,
        }
    }

    /// Run `hook` whenever an operation fails authentication.
    pub fn with_auth_hook(mut self, hook: Arc<dyn AuthFailureHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Page size applied when a list query leaves `limit` unset.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// The same resource, decoded as `U`.
    pub fn retyped<U>(&self) -> ResourceApi<U> {
        ResourceApi {
            descriptor: self.descriptor,
            client: Arc::clone(&self.client),
            cache: Arc::clone(&self.cache),
            hook: self.hook.clone(),
            page_size: self.page_size,
            _marker: PhantomData,
        }
    }

    pub fn descriptor(&self) -> ResourceDescriptor {
        self.descriptor
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    fn tag_type(&self) -> &'static str {
        self.descriptor.tag_type
    }

    /// Fill in the configured page size so equal requests share a key.
    fn normalize(&self, query: &ListQuery) -> ListQuery {
        let mut query = query.clone();
        if query.limit.is_none() {
            if let Some(size) = self.page_size {
                query.limit = Some(Limit::Count(size));
            }
        }
        query
    }

    fn guard<R>(&self, result: Result<R, CoreError>) -> Result<R, CoreError> {
        if let Err(err) = &result {
            if err.is_auth_failure() {
                if let Some(hook) = &self.hook {
                    hook.on_auth_failure(err);
                }
            }
        }
        result
    }
}

impl<T: DeserializeOwned> ResourceApi<T> {
    /// One page of the collection. Identical queries are served from cache
    /// until a mutation invalidates them.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<T>, CoreError> {
        let query = self.normalize(query);
        let key = QueryKey::list(self.descriptor.name, &query);
        let client = Arc::clone(&self.client);
        let name = self.descriptor.name;

        let fetched = self
            .cache
            .fetch(key, self.tag_type(), move || async move {
                let page: Page<Value> = client.list_resource(name, &query).await?;
                serde_json::to_value(page).map_err(|e| CoreError::decode(&e))
            })
            .await;
        let raw = self.guard(fetched)?;
        Page::<T>::deserialize(&*raw).map_err(|e| CoreError::decode(&e))
    }

    /// Every record matching `query`, ignoring its page and limit.
    pub async fn list_all(&self, query: &ListQuery) -> Result<Vec<T>, CoreError> {
        let mut query = query.clone();
        query.page = None;
        query.limit = Some(Limit::All);
        Ok(self.list(&query).await?.items)
    }

    pub async fn get(&self, id: &str) -> Result<T, CoreError> {
        let key = QueryKey::get(self.descriptor.name, id);
        let client = Arc::clone(&self.client);
        let name = self.descriptor.name;
        let owned_id = id.to_owned();

        let fetched = self
            .cache
            .fetch(key, self.tag_type(), move || async move {
                client
                    .get_resource::<Value>(name, &owned_id)
                    .await
                    .map_err(CoreError::from)
            })
            .await;
        let raw = self.guard(fetched)?;
        T::deserialize(&*raw).map_err(|e| CoreError::decode(&e))
    }

    /// Create a record; every cached list of this resource goes stale.
    pub async fn create<B: Serialize + Sync + ?Sized>(&self, data: &B) -> Result<T, CoreError> {
        let created = self
            .client
            .create_resource::<Value, _>(self.descriptor.name, data)
            .await
            .map_err(CoreError::from);
        let created = self.guard(created)?;
        debug!(resource = self.descriptor.name, id = ?value_id(&created), "created");
        self.cache.invalidate(&[Tag::list(self.tag_type())]);
        serde_json::from_value(created).map_err(|e| CoreError::decode(&e))
    }

    /// Update a record; its own entry and every cached list go stale.
    pub async fn update<B: Serialize + Sync + ?Sized>(&self, id: &str, data: &B) -> Result<T, CoreError> {
        let updated = self
            .client
            .update_resource::<Value, _>(self.descriptor.name, id, data)
            .await
            .map_err(CoreError::from);
        let updated = self.guard(updated)?;
        debug!(resource = self.descriptor.name, id, "updated");
        self.cache
            .invalidate(&[Tag::id(self.tag_type(), id), Tag::list(self.tag_type())]);
        serde_json::from_value(updated).map_err(|e| CoreError::decode(&e))
    }

    /// Delete a record.
    ///
    /// The record is removed from every cached list of this resource before
    /// the request is sent, and put back if the request fails. Returns the
    /// server's confirmation message.
    pub async fn delete(&self, id: &str) -> Result<Option<String>, CoreError> {
        let name = self.descriptor.name;
        let result = optimistic(
            &self.cache,
            |cache| cache.patch_lists(name, |page| remove_from_page(page, id)),
            async {
                self.client
                    .delete_resource(name, id)
                    .await
                    .map_err(CoreError::from)
            },
        )
        .await;
        let message = self.guard(result)?;

        debug!(resource = name, id, "deleted");
        self.cache.evict(&QueryKey::get(name, id));
        self.cache
            .invalidate(&[Tag::id(self.tag_type(), id), Tag::list(self.tag_type())]);
        Ok(message)
    }
}

fn is_item(item: &Value, id: &str) -> bool {
    value_id(item).as_deref() == Some(id)
}

/// `page` without the item `id`, or `None` when the page does not hold it.
///
/// The revert puts the item back next to a neighbour it had and returns
/// the count taken from `total`, so it still applies after other patches.
fn remove_from_page(page: &Value, id: &str) -> Option<(Value, Revert)> {
    let mut next = page.clone();
    let items = next.get_mut("items")?.as_array_mut()?;
    let index = items.iter().position(|item| is_item(item, id))?;
    let removed = items.remove(index);
    let after = items.get(index).and_then(value_id);
    let before = index.checked_sub(1).and_then(|i| items.get(i)).and_then(value_id);

    let decremented = match (page.get("total").and_then(Value::as_u64), next.as_object_mut()) {
        (Some(total), Some(fields)) if total > 0 => {
            fields.insert("total".into(), Value::from(total - 1));
            true
        }
        _ => false,
    };

    let id = id.to_owned();
    let revert: Revert = Box::new(move |current: &Value| {
        let mut back = current.clone();
        let items = back.get_mut("items")?.as_array_mut()?;
        if items.iter().any(|item| is_item(item, &id)) {
            return None;
        }
        let position = |neighbour: Option<&str>| {
            neighbour.and_then(|other| items.iter().position(|item| is_item(item, other)))
        };
        let at = position(after.as_deref())
            .or_else(|| position(before.as_deref()).map(|i| i + 1))
            .unwrap_or(index)
            .min(items.len());
        items.insert(at, removed.clone());
        if decremented {
            let total = back.get("total").and_then(Value::as_u64);
            if let (Some(total), Some(fields)) = (total, back.as_object_mut()) {
                fields.insert("total".into(), Value::from(total + 1));
            }
        }
        Some(back)
    });
    Some((next, revert))
}
