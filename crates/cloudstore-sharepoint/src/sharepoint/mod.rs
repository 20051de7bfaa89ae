//! # SharePoint backend
//!
//! - `types`: site configuration, OData constants, request digest
//! - `escape`: OData string-literal escaping for paths and names
//! - `auth`: SAML (SharePoint Online) and basic auth strategies
//! - `api_client`: REST client: auth, digest, status checking
//! - `web`: library calls (recycle bin)
//! - `service`: `SharepointService`, the `Filestore` implementation

pub mod types;
pub mod escape;
pub mod auth;
pub mod api_client;
pub mod web;
pub mod service;

pub use api_client::SpClient;
pub use auth::{AuthStrategy, BasicAuth, SamlAuth};
pub use service::SharepointService;
pub use types::*;
pub use web::SpWeb;
