//! Request and result shapes shared by every filestore backend.

use crate::error::FilestoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::io::AsyncRead;

/// Readable byte stream supplied by the caller for uploads.
pub type ContentStream = Box<dyn AsyncRead + Send + Sync + Unpin>;

// ═══════════════════════════════════════════════════════════════════════
//  FileModel
// ═══════════════════════════════════════════════════════════════════════

/// Parameter bag describing a single file or folder operation.
///
/// Which fields matter depends on the operation and the backend:
/// `parent_id` is the destination folder for uploads, `sources_id` the
/// server-relative file path for downloads and deletes.
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileModel {
    #[serde(rename = "parentID", default, skip_serializing_if = "String::is_empty")]
    pub parent_id: String,
    #[serde(rename = "sourcesID", default, skip_serializing_if = "String::is_empty")]
    pub sources_id: String,
    #[serde(rename = "destinationID", default, skip_serializing_if = "String::is_empty")]
    pub destination_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub destination: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Upload payload. Owned by the caller; adapters read it to the end once
    /// and never rewind or retry.
    #[serde(skip)]
    pub content: Option<ContentStream>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query: String,
}

impl FileModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model for an upload of `content` into folder `parent` as `name`.
    pub fn upload<R>(parent: impl Into<String>, name: impl Into<String>, content: R) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        Self {
            parent_id: parent.into(),
            name: name.into(),
            content: Some(Box::new(content)),
            ..Self::default()
        }
    }

    /// Model addressing one existing item by server-relative path.
    pub fn for_source(sources_id: impl Into<String>) -> Self {
        Self {
            sources_id: sources_id.into(),
            ..Self::default()
        }
    }

    pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = parent_id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_content<R>(mut self, content: R) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        self.content = Some(Box::new(content));
        self
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

impl fmt::Debug for FileModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileModel")
            .field("parent_id", &self.parent_id)
            .field("sources_id", &self.sources_id)
            .field("destination_id", &self.destination_id)
            .field("source", &self.source)
            .field("sources", &self.sources)
            .field("destination", &self.destination)
            .field("destinations", &self.destinations)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("path", &self.path)
            .field("content", &self.content.as_ref().map(|_| "<stream>"))
            .field("query", &self.query)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Capabilities
// ═══════════════════════════════════════════════════════════════════════

/// Operations of the `Filestore` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    List,
    Search,
    Metadata,
    Upload,
    Download,
    Delete,
    Move,
    CreateFolder,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::List,
        Capability::Search,
        Capability::Metadata,
        Capability::Upload,
        Capability::Download,
        Capability::Delete,
        Capability::Move,
        Capability::CreateFolder,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Backend families a `Filestore` can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sharepoint,
}

// ═══════════════════════════════════════════════════════════════════════
//  Results
// ═══════════════════════════════════════════════════════════════════════

/// Payload returned by a capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileResult {
    /// Raw response body as delivered by the backend.
    Body(Vec<u8>),
    /// The capability is declared but this backend does not implement it yet.
    /// This is not an error, and it is not a real result either.
    NotImplemented(Capability),
}

impl FileResult {
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            FileResult::Body(b) => Some(b),
            FileResult::NotImplemented(_) => None,
        }
    }

    pub fn into_body(self) -> Option<Vec<u8>> {
        match self {
            FileResult::Body(b) => Some(b),
            FileResult::NotImplemented(_) => None,
        }
    }

    /// Body decoded as UTF-8 (lossy), for JSON/text responses.
    pub fn as_text(&self) -> Option<String> {
        self.body().map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, FileResult::NotImplemented(_))
    }
}

/// Outcome of a (batch) move: a result plus one error per failed source.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub result: FileResult,
    pub errors: Vec<FilestoreError>,
}

impl MoveOutcome {
    pub fn not_implemented() -> Self {
        Self {
            result: FileResult::NotImplemented(Capability::Move),
            errors: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
