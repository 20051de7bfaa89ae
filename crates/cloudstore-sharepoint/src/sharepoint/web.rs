//! Library-level web operations: recycle bin handling for files.
//!
//! Calls made through `SpWeb` carry the shared session headers
//! (minimal-metadata OData and the configured `Accept-Language`).

use crate::sharepoint::api_client::SpClient;
use crate::sharepoint::escape::odata_literal;
use crate::sharepoint::types::recycle_item_id;
use cloudstore_core::{FilestoreError, FilestoreResult};
use log::info;
use reqwest::header::HeaderMap;
use reqwest::Method;

pub struct SpWeb<'a> {
    client: &'a SpClient,
    headers: HeaderMap,
}

impl<'a> SpWeb<'a> {
    pub fn new(client: &'a SpClient, headers: HeaderMap) -> Self {
        Self { client, headers }
    }

    /// Move a file to the site recycle bin.
    ///
    /// Succeeds on any 2xx answer. The recycle-bin item id is returned when
    /// the response body carries one.
    pub async fn recycle(&self, server_relative_url: &str) -> FilestoreResult<Option<String>> {
        let path = format!(
            "_api/web/GetFileByServerRelativeUrl('{}')/recycle",
            odata_literal(server_relative_url)
        );
        let body = self
            .client
            .execute(Method::POST, &path, self.headers.clone(), None)
            .await?;
        let item_id = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| recycle_item_id(&json));
        match item_id {
            Some(ref id) => info!("Recycled {} (recycle-bin item {})", server_relative_url, id),
            None => info!("Recycled {}", server_relative_url),
        }
        Ok(item_id)
    }

    /// Like [`recycle`](Self::recycle), but the recycle-bin item id is
    /// required.
    pub async fn recycle_file(&self, server_relative_url: &str) -> FilestoreResult<String> {
        self.recycle(server_relative_url).await?.ok_or_else(|| {
            FilestoreError::backend("recycle response carries no recycle-bin item id")
        })
    }

    /// Restore a recycle-bin item to its original location.
    pub async fn restore_recycled(&self, item_id: &str) -> FilestoreResult<()> {
        let path = format!("_api/web/RecycleBin('{}')/restore()", odata_literal(item_id));
        self.client
            .execute(Method::POST, &path, self.headers.clone(), None)
            .await?;
        info!("Restored recycle-bin item {}", item_id);
        Ok(())
    }
}
