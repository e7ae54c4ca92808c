// ── Resource registry ──
//
// Explicit map from resource name to its untyped operation set. Built once
// per console from `ResourceDescriptor::ALL`.

use indexmap::IndexMap;
use serde_json::Value;

use super::api::ResourceApi;
use super::descriptor::ResourceDescriptor;
use crate::error::CoreError;

pub struct ResourceRegistry {
    apis: IndexMap<&'static str, ResourceApi<Value>>,
}

impl ResourceRegistry {
    /// Build one operation set per descriptor with `make`.
    pub fn new<I, F>(descriptors: I, mut make: F) -> Self
    where
        I: IntoIterator<Item = ResourceDescriptor>,
        F: FnMut(ResourceDescriptor) -> ResourceApi<Value>,
    {
        let apis = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.name, make(descriptor)))
            .collect();
        Self { apis }
    }

    pub fn get(&self, name: &str) -> Result<&ResourceApi<Value>, CoreError> {
        self.apis.get(name).ok_or_else(|| CoreError::UnknownResource {
            name: name.to_owned(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.apis.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.apis.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }
}
