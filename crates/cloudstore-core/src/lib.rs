//! # cloudstore-core: backend-agnostic filestore contract
//!
//! - `model`: the `FileModel` request bag, `FileResult`, `MoveOutcome`,
//!   `Capability` and `BackendKind`
//! - `error`: `FilestoreError` / `FilestoreResult`
//! - `filestore`: the `Filestore` trait every backend implements

pub mod error;
pub mod filestore;
pub mod model;

pub use error::{FilestoreError, FilestoreErrorKind, FilestoreResult};
pub use filestore::Filestore;
pub use model::*;
