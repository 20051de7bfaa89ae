//! HTTP client for the SharePoint REST API.
//!
//! Wraps `reqwest::Client` with the session's auth strategy, automatic
//! `X-RequestDigest` injection for write requests and status-code checking.
//! No retries: every call is exactly one round trip (plus a digest fetch
//! when none is cached).

use crate::sharepoint::auth::{create_strategy, AuthStrategy};
use crate::sharepoint::types::{FormDigest, SharepointConfig, ODATA_VERBOSE};
use cloudstore_core::{FilestoreError, FilestoreResult};
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Method;
use std::time::Duration;
use tokio::sync::Mutex;

const REQUEST_DIGEST: &str = "x-requestdigest";

/// Low-level SharePoint REST client bound to one site and one identity.
pub struct SpClient {
    inner: reqwest::Client,
    site_url: String,
    auth: Box<dyn AuthStrategy>,
    digest: Mutex<Option<FormDigest>>,
}

impl SpClient {
    pub fn new(config: &SharepointConfig) -> FilestoreResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| FilestoreError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            inner,
            site_url: config.site_url().to_string(),
            auth: create_strategy(config)?,
            digest: Mutex::new(None),
        })
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn auth(&self) -> &dyn AuthStrategy {
        self.auth.as_ref()
    }

    /// Full URL for a site-relative REST path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.site_url, path.trim_start_matches('/'))
        }
    }

    /// Execute one request and return the full response body.
    ///
    /// Non-GET requests carry a request digest. Statuses >= 400 become
    /// errors built from the OData error payload.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> FilestoreResult<Vec<u8>> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut headers = headers;
        if method != Method::GET && !headers.contains_key(REQUEST_DIGEST) {
            let digest = self.request_digest().await?;
            headers.insert(
                HeaderName::from_static(REQUEST_DIGEST),
                header_value(&digest)?,
            );
        }

        let mut req = self.inner.request(method, &url).headers(headers);
        if let Some(data) = body {
            req = req.body(data);
        }
        let req = self.auth.authorize(req).await?;

        let resp = req.send().await.map_err(FilestoreError::from)?;
        let status = resp.status().as_u16();
        if status >= 400 {
            let text = resp.text().await.unwrap_or_default();
            return Err(FilestoreError::from_sp_response(status, &text));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FilestoreError::io(format!("Failed to read response body: {}", e)))?;
        debug!("Response status={} body_len={}", status, bytes.len());
        Ok(bytes.to_vec())
    }

    /// Execute and parse the body as JSON (`Null` for an empty body).
    pub async fn execute_json(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> FilestoreResult<serde_json::Value> {
        let bytes = self.execute(method, path, headers, body).await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(FilestoreError::from)
    }

    /// Current request digest, fetched from `/_api/contextinfo` when missing
    /// or expired.
    pub async fn request_digest(&self) -> FilestoreResult<String> {
        let mut guard = self.digest.lock().await;
        if let Some(ref d) = *guard {
            if !d.is_expired() {
                return Ok(d.value.clone());
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ODATA_VERBOSE));
        let url = self.url("_api/contextinfo");
        let req = self
            .inner
            .post(&url)
            .headers(headers)
            .body(Vec::<u8>::new());
        let req = self.auth.authorize(req).await?;
        let resp = req.send().await.map_err(FilestoreError::from)?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(FilestoreError::from)?;
        if status >= 400 {
            return Err(FilestoreError::from_sp_response(status, &text));
        }

        let json: serde_json::Value = serde_json::from_str(&text)?;
        let digest = FormDigest::from_context_info(&json)
            .ok_or_else(|| FilestoreError::backend("contextinfo response has no FormDigestValue"))?;
        debug!("Fetched request digest (expires {})", digest.expires_at);

        let value = digest.value.clone();
        *guard = Some(digest);
        Ok(value)
    }
}

/// Header map from static name/value pairs.
pub fn headers_from(pairs: &[(&'static str, &str)]) -> FilestoreResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(HeaderName::from_static(name), header_value(value)?);
    }
    Ok(map)
}

fn header_value(value: &str) -> FilestoreResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| FilestoreError::invalid_request(format!("Invalid header value: {}", e)))
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
