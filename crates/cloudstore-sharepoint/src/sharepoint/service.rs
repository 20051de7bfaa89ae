//! `SharepointService` – the SharePoint implementation of `Filestore`.
//!
//! One service instance is one authenticated session: the site
//! configuration, a REST client bound to it and the library facade used for
//! recycle-bin calls. Each capability issues a single REST request.

use crate::sharepoint::api_client::{headers_from, SpClient};
use crate::sharepoint::escape::odata_literal;
use crate::sharepoint::types::*;
use crate::sharepoint::web::SpWeb;
use async_trait::async_trait;
use cloudstore_core::{
    BackendKind, Capability, FileModel, FileResult, Filestore, FilestoreError, FilestoreResult,
    MoveOutcome,
};
use log::{debug, info, warn};
use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio::io::AsyncReadExt;

const IMPLEMENTED: &[Capability] = &[
    Capability::List,
    Capability::Upload,
    Capability::Download,
    Capability::Delete,
];

pub struct SharepointService {
    config: SharepointConfig,
    client: SpClient,
    /// Headers for library calls (delete / recycle bin).
    shared_headers: HeaderMap,
}

impl SharepointService {
    /// Build a session for `config`. No network traffic happens until the
    /// first capability call.
    pub fn new(config: SharepointConfig) -> FilestoreResult<Self> {
        if config.site_url().is_empty() {
            return Err(FilestoreError::invalid_request("SharePoint site URL is empty"));
        }
        let client = SpClient::new(&config)?;
        let shared_headers = headers_from(&[
            ("accept", ODATA_MINIMAL),
            ("accept-language", config.accept_language.as_str()),
        ])?;
        Ok(Self {
            config,
            client,
            shared_headers,
        })
    }

    pub fn config(&self) -> &SharepointConfig {
        &self.config
    }

    pub fn client(&self) -> &SpClient {
        &self.client
    }

    /// Library facade carrying the shared session headers.
    pub fn web(&self) -> SpWeb<'_> {
        SpWeb::new(&self.client, self.shared_headers.clone())
    }

    // ─── Endpoints ───────────────────────────────────────────────────

    pub fn list_endpoint() -> String {
        format!("_api/web/lists/getByTitle('{}')/items", DEFAULT_LIST_TITLE)
    }

    pub fn upload_endpoint(parent: &str, name: &str) -> String {
        format!(
            "_api/web/getFolderByServerRelativeUrl('{}')/files/add(overwrite=true,url='{}')",
            odata_literal(parent),
            odata_literal(name)
        )
    }

    pub fn download_endpoint(server_relative_url: &str) -> String {
        format!(
            "_api/Web/GetFileByServerRelativeUrl(@FileServerRelativeUrl)/$value?@FileServerRelativeUrl='{}'",
            odata_literal(server_relative_url)
        )
    }
}

fn require<'m>(value: &'m str, operation: &str, field: &str) -> FilestoreResult<&'m str> {
    if value.is_empty() {
        Err(FilestoreError::missing_field(operation, field))
    } else {
        Ok(value)
    }
}

#[async_trait]
impl Filestore for SharepointService {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Sharepoint
    }

    fn implemented(&self) -> &'static [Capability] {
        IMPLEMENTED
    }

    /// Posts to the fixed `Custom` list. `query` and `path` are not used.
    async fn list(&self, model: &FileModel) -> FilestoreResult<FileResult> {
        if !model.query.is_empty() || !model.path.is_empty() {
            warn!(
                "list ignores query/path; always targets the '{}' list",
                DEFAULT_LIST_TITLE
            );
        }
        let headers = headers_from(&[("accept", ODATA_VERBOSE), ("content-type", ODATA_VERBOSE)])?;
        let body = self
            .client
            .execute(
                Method::POST,
                &Self::list_endpoint(),
                headers,
                Some(LIST_ITEM_BODY.as_bytes().to_vec()),
            )
            .await?;
        Ok(FileResult::Body(body))
    }

    async fn search(&self, _model: &FileModel) -> FilestoreResult<FileResult> {
        debug!("search is not implemented for SharePoint");
        Ok(FileResult::NotImplemented(Capability::Search))
    }

    async fn metadata(&self, _model: &FileModel) -> FilestoreResult<FileResult> {
        debug!("metadata is not implemented for SharePoint");
        Ok(FileResult::NotImplemented(Capability::Metadata))
    }

    async fn upload(&self, model: &mut FileModel) -> FilestoreResult<FileResult> {
        let parent = require(&model.parent_id, "upload", "parent_id")?.to_string();
        let name = require(&model.name, "upload", "name")?.to_string();
        let reader = model
            .content
            .as_mut()
            .ok_or_else(|| FilestoreError::missing_field("upload", "content"))?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.map_err(|e| {
            FilestoreError::io(format!("Unable to read content for {}: {}", name, e))
        })?;

        info!("Uploading {}/{} ({} bytes)", parent, name, data.len());
        let headers = headers_from(&[("accept", ODATA_VERBOSE)])?;
        let body = self
            .client
            .execute(
                Method::POST,
                &Self::upload_endpoint(&parent, &name),
                headers,
                Some(data),
            )
            .await?;
        Ok(FileResult::Body(body))
    }

    async fn download(&self, model: &FileModel) -> FilestoreResult<FileResult> {
        let path = require(&model.sources_id, "download", "sources_id")?;
        let body = self
            .client
            .execute(
                Method::GET,
                &Self::download_endpoint(path),
                HeaderMap::new(),
                None,
            )
            .await?;
        debug!("Downloaded {} ({} bytes)", path, body.len());
        Ok(FileResult::Body(body))
    }

    async fn delete(&self, model: &FileModel) -> FilestoreResult<()> {
        let path = require(&model.sources_id, "delete", "sources_id")?;
        self.web().recycle(path).await.map(|_| ())
    }

    async fn move_items(&self, _model: &FileModel) -> MoveOutcome {
        debug!("move is not implemented for SharePoint");
        MoveOutcome::not_implemented()
    }

    async fn create_folder(&self, _model: &FileModel) -> FilestoreResult<FileResult> {
        debug!("create_folder is not implemented for SharePoint");
        Ok(FileResult::NotImplemented(Capability::CreateFolder))
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
