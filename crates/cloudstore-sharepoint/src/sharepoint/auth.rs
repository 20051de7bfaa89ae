//! Authentication strategies for SharePoint sites.
//!
//! * **SAML** – SharePoint Online user credentials. A WS-Trust request
//!   security token is issued by the STS, posted to the site's
//!   `/_forms/default.aspx?wa=wsignin1.0` endpoint and exchanged for the
//!   `FedAuth` / `rtFa` cookies that authorize subsequent REST calls.
//! * **Basic** – plain HTTP basic credentials (on-premises farms).

use crate::sharepoint::types::{
    expires_within, AuthStrategyKind, SharepointConfig, EXPIRY_GRACE_SECS,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudstore_core::{FilestoreError, FilestoreResult};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use reqwest::header::{HeaderMap, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{redirect, Client, RequestBuilder};
use std::time::Duration;
use tokio::sync::Mutex;

lazy_static! {
    static ref SECURITY_TOKEN_RE: Regex =
        Regex::new(r"<wsse:BinarySecurityToken[^>]*>([^<]+)</wsse:BinarySecurityToken>")
            .expect("valid token regex");
    static ref EXPIRES_RE: Regex =
        Regex::new(r"<wsu:Expires>([^<]+)</wsu:Expires>").expect("valid expires regex");
    static ref FAULT_RE: Regex =
        Regex::new(r"<(?:psf:text|S:Text[^>]*)>([^<]+)</(?:psf:text|S:Text)>")
            .expect("valid fault regex");
}

/// Attaches credentials to outgoing REST requests.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn kind(&self) -> AuthStrategyKind;

    /// Authorize `req`, logging in first when no valid credentials are cached.
    async fn authorize(&self, req: RequestBuilder) -> FilestoreResult<RequestBuilder>;
}

/// Create the strategy selected by the configuration.
pub fn create_strategy(config: &SharepointConfig) -> FilestoreResult<Box<dyn AuthStrategy>> {
    match config.strategy {
        AuthStrategyKind::Saml => Ok(Box::new(SamlAuth::new(config)?)),
        AuthStrategyKind::Basic => Ok(Box::new(BasicAuth::new(config))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Basic
// ═══════════════════════════════════════════════════════════════════════

pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(config: &SharepointConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn kind(&self) -> AuthStrategyKind {
        AuthStrategyKind::Basic
    }

    async fn authorize(&self, req: RequestBuilder) -> FilestoreResult<RequestBuilder> {
        Ok(req.basic_auth(&self.username, Some(&self.password)))
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  SAML
// ═══════════════════════════════════════════════════════════════════════

/// Cookie header value plus the moment the underlying token expires.
#[derive(Debug, Clone)]
struct AuthCookie {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AuthCookie {
    fn is_expired(&self) -> bool {
        expires_within(self.expires_at, EXPIRY_GRACE_SECS)
    }
}

/// Security token issued by the STS.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct SamlAuth {
    /// Redirects are not followed so the sign-in cookies stay visible.
    http: Client,
    origin: String,
    sts_url: String,
    username: String,
    password: String,
    /// Held across the whole handshake: one login in flight per session.
    cookie: Mutex<Option<AuthCookie>>,
}

impl SamlAuth {
    pub fn new(config: &SharepointConfig) -> FilestoreResult<Self> {
        let origin = url::Url::parse(config.site_url())?
            .origin()
            .ascii_serialization();

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| FilestoreError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            origin,
            sts_url: config.sts_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            cookie: Mutex::new(None),
        })
    }

    fn signin_url(&self) -> String {
        format!("{}/_forms/default.aspx?wa=wsignin1.0", self.origin)
    }

    /// Return cached cookies, logging in when absent or expired.
    async fn cookie(&self) -> FilestoreResult<String> {
        let mut guard = self.cookie.lock().await;
        if let Some(ref c) = *guard {
            if !c.is_expired() {
                return Ok(c.value.clone());
            }
        }

        let fresh = self.login().await?;
        let value = fresh.value.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    async fn login(&self) -> FilestoreResult<AuthCookie> {
        debug!("Requesting security token from {}", self.sts_url);
        let envelope = build_token_request(&self.username, &self.password, &self.signin_url());

        let resp = self
            .http
            .post(&self.sts_url)
            .header(CONTENT_TYPE, "application/soap+xml; charset=utf-8")
            .body(envelope)
            .send()
            .await?;
        let body = resp.text().await?;
        let token = parse_token_response(&body)?;

        let resp = self
            .http
            .post(self.signin_url())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(token.token.clone())
            .send()
            .await?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FilestoreError::auth(format!(
                "Sign-in rejected by {} (HTTP {})",
                self.origin,
                status.as_u16()
            ))
            .with_status(status.as_u16()));
        }

        let value = collect_auth_cookies(resp.headers()).ok_or_else(|| {
            FilestoreError::auth(format!("No FedAuth/rtFa cookies returned by {}", self.origin))
        })?;

        info!("Authenticated {} against {}", self.username, self.origin);
        Ok(AuthCookie {
            value,
            expires_at: token.expires_at,
        })
    }
}

#[async_trait]
impl AuthStrategy for SamlAuth {
    fn kind(&self) -> AuthStrategyKind {
        AuthStrategyKind::Saml
    }

    async fn authorize(&self, req: RequestBuilder) -> FilestoreResult<RequestBuilder> {
        let cookie = self.cookie().await?;
        Ok(req.header(COOKIE, cookie))
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn xml_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// WS-Trust `RequestSecurityToken` envelope for the user-credential flow.
pub fn build_token_request(username: &str, password: &str, applies_to: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing" xmlns:u="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Issue</a:Action>
    <a:MessageID>urn:uuid:{message_id}</a:MessageID>
    <a:ReplyTo><a:Address>http://www.w3.org/2005/08/addressing/anonymous</a:Address></a:ReplyTo>
    <o:Security s:mustUnderstand="1" xmlns:o="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd">
      <o:UsernameToken>
        <o:Username>{username}</o:Username>
        <o:Password>{password}</o:Password>
      </o:UsernameToken>
    </o:Security>
  </s:Header>
  <s:Body>
    <t:RequestSecurityToken xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust">
      <wsp:AppliesTo xmlns:wsp="http://schemas.xmlsoap.org/ws/2004/09/policy">
        <a:EndpointReference><a:Address>{applies_to}</a:Address></a:EndpointReference>
      </wsp:AppliesTo>
      <t:KeyType>http://schemas.xmlsoap.org/ws/2005/05/identity/NoProofKey</t:KeyType>
      <t:RequestType>http://schemas.xmlsoap.org/ws/2005/02/trust/Issue</t:RequestType>
      <t:TokenType>urn:oasis:names:tc:SAML:1.0:assertion</t:TokenType>
    </t:RequestSecurityToken>
  </s:Body>
</s:Envelope>"#,
        message_id = uuid::Uuid::new_v4(),
        username = xml_escape(username),
        password = xml_escape(password),
        applies_to = xml_escape(applies_to),
    )
}

/// Extract the binary security token (and its expiry) from an STS response.
pub fn parse_token_response(body: &str) -> FilestoreResult<SecurityToken> {
    if let Some(token) = SECURITY_TOKEN_RE.captures(body).and_then(|c| c.get(1)) {
        let expires_at = EXPIRES_RE
            .captures_iter(body)
            .filter_map(|c| c.get(1))
            .filter_map(|m| DateTime::parse_from_rfc3339(m.as_str().trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .max()
            .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));

        return Ok(SecurityToken {
            token: xml_unescape(token.as_str().trim()),
            expires_at,
        });
    }

    let reason = FAULT_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| xml_unescape(m.as_str()))
        .unwrap_or_else(|| "no security token in STS response".to_string());
    Err(FilestoreError::auth(format!("STS login failed: {}", reason)))
}

/// Build a `Cookie` header value from the `FedAuth` and `rtFa` cookies set
/// by the sign-in endpoint.
pub fn collect_auth_cookies(headers: &HeaderMap) -> Option<String> {
    let mut pairs = Vec::new();
    for value in headers.get_all(SET_COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        let pair = raw.split(';').next().unwrap_or_default().trim();
        if pair.starts_with("FedAuth=") || pair.starts_with("rtFa=") {
            pairs.push(pair.to_string());
        }
    }
    if pairs.iter().any(|p| p.starts_with("FedAuth=")) {
        Some(pairs.join("; "))
    } else {
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
