// Generic collection endpoints
//
// Every CRUD resource on the backend follows the same five-route shape,
// so these methods take the resource path segment (`lead`, `contact`, ...)
// and leave typing to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{ApiClient, require_data};
use crate::envelope::{ListQuery, Page};
use crate::error::Error;

impl ApiClient {
    /// `GET /{resource}?page=&limit=&...filters`
    pub async fn list_resource<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &ListQuery,
    ) -> Result<Page<T>, Error> {
        let url = self.endpoint(&[resource])?;
        let params = query.to_params();
        let page = require_data(self.get::<Page<T>>(url, &params).await?, resource)?;
        debug!(
            resource,
            items = page.items.len(),
            total = page.total,
            "listed resource"
        );
        Ok(page)
    }

    /// `GET /{resource}/{id}`
    pub async fn get_resource<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: &str,
    ) -> Result<T, Error> {
        let url = self.endpoint(&[resource, id])?;
        require_data(self.get(url, &[]).await?, resource)
    }

    /// `POST /{resource}`
    pub async fn create_resource<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.endpoint(&[resource])?;
        require_data(self.post(url, body).await?, resource)
    }

    /// `PUT /{resource}/{id}`
    pub async fn update_resource<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        resource: &str,
        id: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.endpoint(&[resource, id])?;
        require_data(self.put(url, body).await?, resource)
    }

    /// `DELETE /{resource}/{id}`
    ///
    /// Returns the server's confirmation message, if any.
    pub async fn delete_resource(&self, resource: &str, id: &str) -> Result<Option<String>, Error> {
        let url = self.endpoint(&[resource, id])?;
        let envelope = self.delete(url).await?;
        Ok(envelope.message)
    }
}
