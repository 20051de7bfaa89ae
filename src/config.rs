//! Service configuration: which backend to talk to and how to reach it.
//!
//! Loaded from JSON, e.g.
//!
//! ```json
//! { "backend": { "backend": "sharepoint",
//!                "siteUrl": "https://contoso.sharepoint.com/sites/dev",
//!                "username": "svc@contoso.com", "password": "..." } }
//! ```

use cloudstore_core::{BackendKind, FilestoreError, FilestoreResult};
use cloudstore_sharepoint::SharepointConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Connection parameters for one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum BackendConfig {
    Sharepoint(SharepointConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Sharepoint(_) => BackendKind::Sharepoint,
        }
    }

    /// Deterministic identity of the connection parameters: lowercase hex
    /// SHA-256 of the canonical JSON form. Equal configurations always share
    /// a fingerprint; any differing field changes it.
    pub fn fingerprint(&self) -> String {
        // Serializing plain strings and integers cannot fail.
        let canonical = serde_json::to_vec(&self.canonical()).unwrap_or_default();
        hex::encode(Sha256::digest(&canonical))
    }

    /// Copy with equivalent spellings collapsed (trailing slash on the site URL).
    fn canonical(&self) -> BackendConfig {
        match self {
            BackendConfig::Sharepoint(sp) => BackendConfig::Sharepoint(SharepointConfig {
                site_url: sp.site_url().to_string(),
                ..sp.clone()
            }),
        }
    }

    pub fn validate(&self) -> FilestoreResult<()> {
        match self {
            BackendConfig::Sharepoint(sp) => {
                let site = sp.site_url();
                if !(site.starts_with("https://") || site.starts_with("http://")) {
                    return Err(FilestoreError::invalid_request(format!(
                        "SharePoint site URL must be http(s): '{}'",
                        sp.site_url
                    )));
                }
                if sp.username.is_empty() {
                    return Err(FilestoreError::invalid_request(
                        "SharePoint username is empty",
                    ));
                }
                Ok(())
            }
        }
    }
}

impl From<SharepointConfig> for BackendConfig {
    fn from(config: SharepointConfig) -> Self {
        BackendConfig::Sharepoint(config)
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub backend: BackendConfig,
}

impl ServiceConfig {
    pub fn new(backend: impl Into<BackendConfig>) -> Self {
        Self {
            backend: backend.into(),
        }
    }

    pub fn from_json_str(json: &str) -> FilestoreResult<Self> {
        let config: ServiceConfig = serde_json::from_str(json)?;
        config.backend.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> FilestoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FilestoreError::io(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn fingerprint(&self) -> String {
        self.backend.fingerprint()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
