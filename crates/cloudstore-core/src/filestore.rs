// ── Filestore capability trait ────────────────────────────────────────────────
//
// Every storage backend implements `Filestore`. Calling code stays
// backend-agnostic: it builds a `FileModel`, asks the session registry for the
// store matching its configuration and invokes one of the capabilities below.

use async_trait::async_trait;

use crate::error::FilestoreResult;
use crate::model::{BackendKind, Capability, FileModel, FileResult, MoveOutcome};

/// Unified interface for file-storage backends.
#[async_trait]
pub trait Filestore: Send + Sync {
    /// Backend identifier.
    fn backend_kind(&self) -> BackendKind;

    /// Capabilities that return real results. The rest answer
    /// `FileResult::NotImplemented`.
    fn implemented(&self) -> &'static [Capability];

    fn supports(&self, capability: Capability) -> bool {
        self.implemented().contains(&capability)
    }

    /// Enumerate items.
    async fn list(&self, model: &FileModel) -> FilestoreResult<FileResult>;

    /// Free-text search over `model.query`.
    async fn search(&self, model: &FileModel) -> FilestoreResult<FileResult>;

    /// Item metadata.
    async fn metadata(&self, model: &FileModel) -> FilestoreResult<FileResult>;

    /// Create or overwrite `model.name` inside `model.parent_id` with the full
    /// content of `model.content`.
    async fn upload(&self, model: &mut FileModel) -> FilestoreResult<FileResult>;

    /// Raw bytes of the file at `model.sources_id`.
    async fn download(&self, model: &FileModel) -> FilestoreResult<FileResult>;

    /// Soft-delete the item at `model.sources_id`.
    async fn delete(&self, model: &FileModel) -> FilestoreResult<()>;

    /// Move `model.sources` to `model.destination`, reporting one error per
    /// failed source.
    async fn move_items(&self, model: &FileModel) -> MoveOutcome;

    /// Create the folder described by `model.destination`.
    async fn create_folder(&self, model: &FileModel) -> FilestoreResult<FileResult>;
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
