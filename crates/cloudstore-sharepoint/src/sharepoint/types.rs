//! Configuration and wire types for the SharePoint REST integration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OData verbosity requested for library calls (delete / recycle bin).
pub const ODATA_MINIMAL: &str = "application/json;odata=minimalmetadata";

/// OData verbosity used by the list and upload endpoints.
pub const ODATA_VERBOSE: &str = "application/json;odata=verbose";

/// Title of the list enumerated by `List`.
pub const DEFAULT_LIST_TITLE: &str = "Custom";

/// Item payload posted to the list endpoint.
pub const LIST_ITEM_BODY: &str =
    r#"{"__metadata":{"type":"SP.Data.CustomListItem"},"Title":"Test"}"#;

/// Microsoft security token service used for SharePoint Online SAML logins.
pub const DEFAULT_STS_URL: &str = "https://login.microsoftonline.com/extSTS.srf";

// ═══════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════

/// How a session authenticates against the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategyKind {
    /// SharePoint Online user credentials exchanged for auth cookies.
    #[default]
    Saml,
    /// HTTP basic credentials sent with every request (on-premises farms).
    Basic,
}

/// Connection parameters for one SharePoint site.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharepointConfig {
    /// Absolute site URL, e.g. `https://contoso.sharepoint.com/sites/dev`.
    pub site_url: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub strategy: AuthStrategyKind,
    /// Value sent as `Accept-Language` on library calls.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Timeout in seconds for every HTTP call.  Default: 60.
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    /// STS endpoint for the SAML strategy.
    #[serde(default = "default_sts_url")]
    pub sts_url: String,
}

fn default_accept_language() -> String {
    "de-DE,de;q=0.9".into()
}

fn default_timeout_sec() -> u64 {
    60
}

fn default_sts_url() -> String {
    DEFAULT_STS_URL.into()
}

impl Default for SharepointConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            username: String::new(),
            password: String::new(),
            strategy: AuthStrategyKind::default(),
            accept_language: default_accept_language(),
            timeout_sec: default_timeout_sec(),
            sts_url: default_sts_url(),
        }
    }
}

impl SharepointConfig {
    pub fn new(site_url: &str, username: &str, password: &str) -> Self {
        Self {
            site_url: site_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: AuthStrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Site URL without trailing slash.
    pub fn site_url(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    pub fn masked_password(&self) -> String {
        if self.password.chars().count() <= 4 {
            return "****".to_string();
        }
        let head: String = self.password.chars().take(2).collect();
        format!("{}****", head)
    }
}

impl fmt::Debug for SharepointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharepointConfig")
            .field("site_url", &self.site_url)
            .field("username", &self.username)
            .field("password", &self.masked_password())
            .field("strategy", &self.strategy)
            .field("accept_language", &self.accept_language)
            .field("timeout_sec", &self.timeout_sec)
            .field("sts_url", &self.sts_url)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Request digest
// ═══════════════════════════════════════════════════════════════════════

/// Refresh margin ahead of a credential's expiry.
pub const EXPIRY_GRACE_SECS: i64 = 60;

/// Digest lifetime assumed when `contextinfo` does not report one.
const DEFAULT_DIGEST_TIMEOUT_SECS: i64 = 1800;

/// Upper bound on a server-reported digest lifetime.
const MAX_DIGEST_TIMEOUT_SECS: i64 = 86_400;

/// Whether `expires_at` lies within `grace_secs` of now. An expiry too close
/// to the representable range to subtract from counts as expired.
pub(crate) fn expires_within(expires_at: DateTime<Utc>, grace_secs: i64) -> bool {
    match expires_at.checked_sub_signed(chrono::Duration::seconds(grace_secs)) {
        Some(deadline) => Utc::now() >= deadline,
        None => true,
    }
}

/// `X-RequestDigest` value obtained from `/_api/contextinfo`.
#[derive(Debug, Clone)]
pub struct FormDigest {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    /// Seconds before `expires_at` at which the digest is refreshed.
    grace_secs: i64,
}

impl FormDigest {
    /// Whether the digest is expired or inside its refresh margin.
    pub fn is_expired(&self) -> bool {
        expires_within(self.expires_at, self.grace_secs)
    }

    /// Parse a `contextinfo` response in verbose or no/minimal-metadata form.
    ///
    /// The reported lifetime is clamped to `0..=86400` seconds; a missing or
    /// non-integer value means 1800. The refresh margin is 60 s, or a quarter
    /// of the lifetime for short-lived digests.
    pub fn from_context_info(body: &serde_json::Value) -> Option<Self> {
        let info = if body["d"]["GetContextWebInformation"].is_object() {
            &body["d"]["GetContextWebInformation"]
        } else {
            body
        };
        let value = info["FormDigestValue"].as_str()?.to_string();
        let timeout = info["FormDigestTimeoutSeconds"]
            .as_i64()
            .unwrap_or(DEFAULT_DIGEST_TIMEOUT_SECS)
            .clamp(0, MAX_DIGEST_TIMEOUT_SECS);
        Some(Self {
            value,
            expires_at: Utc::now() + chrono::Duration::seconds(timeout),
            grace_secs: EXPIRY_GRACE_SECS.min(timeout / 4),
        })
    }
}

/// Extract the recycle-bin item id from a `recycle` response.
pub fn recycle_item_id(body: &serde_json::Value) -> Option<String> {
    body["d"]["Recycle"]
        .as_str()
        .or_else(|| body["value"].as_str())
        .map(String::from)
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
