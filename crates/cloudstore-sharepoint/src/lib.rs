//! # cloudstore-sharepoint: SharePoint filestore backend
//!
//! Implements the `cloudstore_core::Filestore` contract against the
//! SharePoint REST API (`/_api/web/...`).
//!
//! - **Auth**: SharePoint Online SAML (STS token → `FedAuth`/`rtFa` cookies)
//!   or HTTP basic credentials, plus request-digest handling for writes
//! - **Files**: upload (always overwrite), raw download, fixed-list listing
//! - **Recycle bin**: soft delete and restore

pub mod sharepoint;

pub use sharepoint::*;
