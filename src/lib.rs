//! # cloudstore: uniform filestore adapter
//!
//! Backend-agnostic list / upload / download / delete against
//! document-management services. Callers build a [`FileModel`], obtain a
//! [`Filestore`] from a [`SessionRegistry`] keyed by their
//! [`ServiceConfig`], and invoke a capability:
//!
//! ```no_run
//! # async fn demo() -> cloudstore::FilestoreResult<()> {
//! use cloudstore::{FileModel, Filestore, ServiceConfig, SessionRegistry};
//!
//! let registry = SessionRegistry::new();
//! let config = ServiceConfig::from_file("cloudstore.json")?;
//! let store = registry.get_or_create(&config)?;
//!
//! let mut model = FileModel::upload("/sites/dev/Shared Documents", "a.txt", &b"hello"[..]);
//! store.upload(&mut model).await?;
//! let bytes = store
//!     .download(&FileModel::for_source("/sites/dev/Shared Documents/a.txt"))
//!     .await?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```
//!
//! Backends: SharePoint (`cloudstore-sharepoint`).

pub mod config;
pub mod logging;
pub mod registry;

pub use cloudstore_core::*;
pub use cloudstore_sharepoint::{AuthStrategyKind, SharepointConfig, SharepointService};
pub use config::{BackendConfig, ServiceConfig};
pub use registry::{connect, Connector, FilestoreHandle, SessionRegistry};
