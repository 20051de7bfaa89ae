//! Session registry: one live backend session per configuration fingerprint.
//!
//! The registry is an ordinary value: construct it once at start-up and pass
//! it by reference (or `Arc`) to whoever needs a `Filestore`. Sessions are
//! created on first use, shared by every caller with the same fingerprint
//! and kept for the registry's lifetime. There is no eviction, TTL or
//! refresh; a session whose credentials go stale stays registered.

use crate::config::{BackendConfig, ServiceConfig};
use cloudstore_core::{Filestore, FilestoreError, FilestoreResult};
use cloudstore_sharepoint::SharepointService;
use log::info;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared handle to a backend session.
pub type FilestoreHandle = Arc<dyn Filestore>;

/// Builds a new session for a backend configuration.
pub type Connector = Box<dyn Fn(&BackendConfig) -> FilestoreResult<FilestoreHandle> + Send + Sync>;

/// Construct the adapter matching `config`. Performs no network I/O.
pub fn connect(config: &BackendConfig) -> FilestoreResult<FilestoreHandle> {
    match config {
        BackendConfig::Sharepoint(sp) => {
            let service = SharepointService::new(sp.clone())?;
            info!("Connected to Sharepoint Server {}", sp.site_url());
            Ok(Arc::new(service))
        }
    }
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, FilestoreHandle>>,
    connector: Connector,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_connector(connect)
    }

    /// Registry using a custom session factory.
    pub fn with_connector<F>(connector: F) -> Self
    where
        F: Fn(&BackendConfig) -> FilestoreResult<FilestoreHandle> + Send + Sync + 'static,
    {
        Self {
            sessions: Mutex::new(HashMap::new()),
            connector: Box::new(connector),
        }
    }

    /// Return the session for `config`, creating and registering it on
    /// first use.
    ///
    /// Lookup, construction and insertion happen under one lock, so
    /// concurrent first use of a fingerprint still builds exactly one
    /// session. Construction is cheap (authentication is deferred to the
    /// first request), which keeps the critical section short.
    pub fn get_or_create(&self, config: &ServiceConfig) -> FilestoreResult<FilestoreHandle> {
        self.get_or_create_backend(&config.backend)
    }

    pub fn get_or_create_backend(&self, backend: &BackendConfig) -> FilestoreResult<FilestoreHandle> {
        let fingerprint = backend.fingerprint();
        let mut sessions = self.lock()?;

        if let Some(existing) = sessions.get(&fingerprint) {
            return Ok(Arc::clone(existing));
        }

        let session = (self.connector)(backend)?;
        sessions.insert(fingerprint, Arc::clone(&session));
        Ok(session)
    }

    pub fn contains(&self, config: &ServiceConfig) -> bool {
        self.lock()
            .map(|s| s.contains_key(&config.fingerprint()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fingerprints of all registered sessions, sorted.
    pub fn fingerprints(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn lock(&self) -> FilestoreResult<std::sync::MutexGuard<'_, HashMap<String, FilestoreHandle>>> {
        self.sessions
            .lock()
            .map_err(|_| FilestoreError::backend("session registry lock poisoned"))
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
