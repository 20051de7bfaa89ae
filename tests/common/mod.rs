//! In-process stand-in for a SharePoint site, served by axum on a random
//! local port. It understands the handful of REST endpoints the adapter
//! calls, the STS / sign-in handshake used by the SAML strategy and basic
//! credentials, and records every request it sees.

#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use cloudstore::{AuthStrategyKind, SharepointConfig};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const SITE_PATH: &str = "/sites/dev";
pub const LIBRARY: &str = "/sites/dev/Shared Documents";
pub const USERNAME: &str = "svc@contoso.com";
pub const PASSWORD: &str = "s3cret";
pub const DIGEST: &str = "0x1234ABCD,16 Oct 2026 10:00:00 -0000";

const BASIC_CREDENTIALS: &str = "Basic c3ZjQGNvbnRvc28uY29tOnMzY3JldA==";
const SECURITY_TOKEN: &str = "t=fake-token&p=";
const FEDAUTH: &str = "FedAuth=fake-fedauth";
const ODATA_VERBOSE: &str = "application/json;odata=verbose";
const ODATA_MINIMAL: &str = "application/json;odata=minimalmetadata";

/// One request as seen by the fake, with path and query percent-decoded.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub raw_uri: String,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    /// Server-relative path -> content.
    pub files: HashMap<String, Vec<u8>>,
    /// Recycle-bin item id -> (original path, content).
    pub recycle_bin: HashMap<String, (String, Vec<u8>)>,
    pub requests: Vec<RecordedRequest>,
    pub sts_logins: usize,
    pub digest_fetches: usize,
    pub recycle_reply: RecycleReply,
    /// `FormDigestTimeoutSeconds` reported by `contextinfo` (default 1800).
    pub digest_timeout: Option<i64>,
}

/// Body the fake sends for a successful `recycle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecycleReply {
    /// Minimal metadata: `{"value": id}`.
    #[default]
    Value,
    /// Verbose: `{"d": {"Recycle": id}}`.
    Verbose,
    /// Empty 200.
    Empty,
    /// 200 with a non-JSON body.
    Html,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeSharepoint {
    pub origin: String,
    pub state: Shared,
}

impl FakeSharepoint {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            origin: format!("http://{}", addr),
            state,
        }
    }

    pub fn site_url(&self) -> String {
        format!("{}{}", self.origin, SITE_PATH)
    }

    pub fn sts_url(&self) -> String {
        format!("{}/extSTS.srf", self.origin)
    }

    pub fn basic_config(&self) -> SharepointConfig {
        SharepointConfig::new(&self.site_url(), USERNAME, PASSWORD)
            .with_strategy(AuthStrategyKind::Basic)
    }

    pub fn saml_config(&self) -> SharepointConfig {
        SharepointConfig {
            sts_url: self.sts_url(),
            ..SharepointConfig::new(&self.site_url(), USERNAME, PASSWORD)
        }
    }

    pub fn put_file(&self, path: &str, content: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), content.to_vec());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.state.lock().unwrap().files.len()
    }

    /// Recycle-bin item id holding `path`, if any.
    pub fn recycled_id(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .recycle_bin
            .iter()
            .find(|(_, (p, _))| p == path)
            .map(|(id, _)| id.clone())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests whose decoded path contains `fragment`.
    pub fn requests_to(&self, fragment: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.contains(fragment))
            .collect()
    }

    pub fn sts_logins(&self) -> usize {
        self.state.lock().unwrap().sts_logins
    }

    pub fn digest_fetches(&self) -> usize {
        self.state.lock().unwrap().digest_fetches
    }

    pub fn set_digest_timeout(&self, seconds: i64) {
        self.state.lock().unwrap().digest_timeout = Some(seconds);
    }

    pub fn set_recycle_reply(&self, reply: RecycleReply) {
        self.state.lock().unwrap().recycle_reply = reply;
    }
}

// ─── Request handling ────────────────────────────────────────────────

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = decode(uri.path());
    let query = decode(uri.query().unwrap_or_default());
    let record = RecordedRequest {
        method: method.clone(),
        raw_uri: uri.to_string(),
        path: path.clone(),
        query: query.clone(),
        headers: headers.clone(),
        body: body.to_vec(),
    };

    let mut st = state.lock().unwrap();
    st.requests.push(record);

    if path == "/extSTS.srf" {
        return sts(&mut st, &body);
    }
    if path == "/_forms/default.aspx" {
        return signin(&body);
    }

    let Some(site_path) = path.strip_prefix(SITE_PATH) else {
        return odata_error(StatusCode::NOT_FOUND, "-1, System.IO.FileNotFoundException", "Site not found");
    };

    if !authorized(&headers) {
        return odata_error(
            StatusCode::UNAUTHORIZED,
            "-2147024891, System.UnauthorizedAccessException",
            "Access denied.",
        );
    }

    if method == Method::POST && site_path == "/_api/contextinfo" {
        st.digest_fetches += 1;
        return json(
            StatusCode::OK,
            serde_json::json!({
                "d": { "GetContextWebInformation": {
                    "FormDigestValue": DIGEST,
                    "FormDigestTimeoutSeconds": st.digest_timeout.unwrap_or(1800)
                }}
            }),
        );
    }

    if method != Method::GET && headers.get("x-requestdigest").and_then(|v| v.to_str().ok()) != Some(DIGEST) {
        return odata_error(
            StatusCode::FORBIDDEN,
            "-2130575252, Microsoft.SharePoint.SPException",
            "The security validation for this page is invalid.",
        );
    }

    if method == Method::POST && site_path == "/_api/web/lists/getByTitle('Custom')/items" {
        return json(
            StatusCode::CREATED,
            serde_json::json!({
                "d": {
                    "__metadata": { "type": "SP.Data.CustomListItem" },
                    "Id": 1,
                    "Title": "Test"
                }
            }),
        );
    }

    if method == Method::POST && site_path.starts_with("/_api/web/getFolderByServerRelativeUrl(") {
        let Some((folder, rest)) = literal_after(site_path, "getFolderByServerRelativeUrl('") else {
            return bad_request();
        };
        if !rest.contains("/files/add(overwrite=true,") {
            return bad_request();
        }
        let Some((name, _)) = literal_after(rest, "url='") else {
            return bad_request();
        };
        let full = format!("{}/{}", folder.trim_end_matches('/'), name);
        let len = body.len();
        st.files.insert(full.clone(), body.to_vec());
        return json(
            StatusCode::OK,
            serde_json::json!({
                "d": { "Name": name, "ServerRelativeUrl": full, "Length": len.to_string() }
            }),
        );
    }

    if method == Method::GET
        && site_path == "/_api/Web/GetFileByServerRelativeUrl(@FileServerRelativeUrl)/$value"
    {
        let Some((file_path, _)) = literal_after(&query, "@FileServerRelativeUrl='") else {
            return bad_request();
        };
        return match st.files.get(&file_path) {
            Some(content) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/octet-stream")],
                content.clone(),
            )
                .into_response(),
            None => file_not_found(&file_path),
        };
    }

    if method == Method::POST
        && site_path.starts_with("/_api/web/GetFileByServerRelativeUrl('")
        && site_path.ends_with("/recycle")
    {
        let Some((file_path, _)) = literal_after(site_path, "GetFileByServerRelativeUrl('") else {
            return bad_request();
        };
        let Some(content) = st.files.remove(&file_path) else {
            return file_not_found(&file_path);
        };
        let id = uuid::Uuid::new_v4().to_string();
        st.recycle_bin.insert(id.clone(), (file_path, content));
        return match st.recycle_reply {
            RecycleReply::Value => json(
                StatusCode::OK,
                serde_json::json!({ "odata.metadata": "_api/$metadata#Edm.Guid", "value": id }),
            ),
            RecycleReply::Verbose => json(StatusCode::OK, serde_json::json!({ "d": { "Recycle": id } })),
            RecycleReply::Empty => StatusCode::OK.into_response(),
            RecycleReply::Html => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html")],
                "<html><body>OK</body></html>",
            )
                .into_response(),
        };
    }

    if method == Method::POST && site_path.starts_with("/_api/web/RecycleBin('") {
        let Some((id, rest)) = literal_after(site_path, "RecycleBin('") else {
            return bad_request();
        };
        if rest != ")/restore()" {
            return bad_request();
        }
        let Some((file_path, content)) = st.recycle_bin.remove(&id) else {
            return odata_error(
                StatusCode::NOT_FOUND,
                "-2147024809, System.ArgumentException",
                "Item does not exist.",
            );
        };
        st.files.insert(file_path, content);
        return StatusCode::OK.into_response();
    }

    odata_error(
        StatusCode::NOT_FOUND,
        "-1, Microsoft.SharePoint.Client.ResourceNotFoundException",
        "Cannot find resource for the request.",
    )
}

fn sts(st: &mut FakeState, body: &[u8]) -> Response {
    let envelope = String::from_utf8_lossy(body);
    let user_ok = envelope.contains(&format!("<o:Username>{}</o:Username>", USERNAME));
    let pass_ok = envelope.contains(&format!("<o:Password>{}</o:Password>", PASSWORD));
    if !(user_ok && pass_ok) {
        let fault = r#"<S:Envelope><S:Body><S:Fault><S:Code><S:Value>S:Sender</S:Value></S:Code>
            <S:Detail><psf:error><psf:internalerror><psf:text>The entered and stored passwords do not match.</psf:text></psf:internalerror></psf:error></S:Detail>
            </S:Fault></S:Body></S:Envelope>"#;
        return (StatusCode::INTERNAL_SERVER_ERROR, fault).into_response();
    }
    st.sts_logins += 1;
    let ok = format!(
        r#"<S:Envelope><S:Body><wst:RequestSecurityTokenResponse>
            <wst:Lifetime><wsu:Created>2026-01-01T00:00:00Z</wsu:Created><wsu:Expires>2099-01-01T00:00:00Z</wsu:Expires></wst:Lifetime>
            <wst:RequestedSecurityToken><wsse:BinarySecurityToken Id="Compact0">{}</wsse:BinarySecurityToken></wst:RequestedSecurityToken>
            </wst:RequestSecurityTokenResponse></S:Body></S:Envelope>"#,
        SECURITY_TOKEN.replace('&', "&amp;")
    );
    (StatusCode::OK, ok).into_response()
}

fn signin(body: &[u8]) -> Response {
    if body != SECURITY_TOKEN.as_bytes() {
        return StatusCode::FORBIDDEN.into_response();
    }
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, "/")
        .header(header::SET_COOKIE, "rtFa=fake-rtfa; domain=127.0.0.1; path=/; HttpOnly")
        .header(header::SET_COOKIE, format!("{}; path=/; HttpOnly", FEDAUTH))
        .body(Body::empty())
        .unwrap()
}

fn authorized(headers: &HeaderMap) -> bool {
    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(BASIC_CREDENTIALS);
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|c| c.split("; ").any(|p| p == FEDAUTH))
        .unwrap_or(false);
    basic || cookie
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Read the OData string literal that starts right after `prefix`,
/// collapsing doubled quotes. Returns the literal and the text after its
/// closing quote.
fn literal_after<'a>(s: &'a str, prefix: &str) -> Option<(String, &'a str)> {
    let start = s.find(prefix)? + prefix.len();
    let rest = &s[start..];
    let mut out = String::new();
    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if let Some(&(_, '\'')) = chars.peek() {
                chars.next();
                out.push('\'');
                continue;
            }
            return Some((out, &rest[i + 1..]));
        }
        out.push(c);
    }
    None
}

fn json(status: StatusCode, body: serde_json::Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json;odata=verbose;charset=utf-8")],
        body.to_string(),
    )
        .into_response()
}

fn odata_error(status: StatusCode, code: &str, message: &str) -> Response {
    json(
        status,
        serde_json::json!({
            "odata.error": {
                "code": code,
                "message": { "lang": "en-US", "value": message }
            }
        }),
    )
}

fn file_not_found(path: &str) -> Response {
    odata_error(
        StatusCode::NOT_FOUND,
        "-2130575338, Microsoft.SharePoint.SPException",
        &format!("The file {} does not exist.", path),
    )
}

fn bad_request() -> Response {
    odata_error(
        StatusCode::BAD_REQUEST,
        "-1, Microsoft.SharePoint.Client.InvalidClientQueryException",
        "The expression is not valid.",
    )
}

/// Header constants callers compare recorded requests against.
pub mod expect {
    pub const VERBOSE: &str = super::ODATA_VERBOSE;
    pub const MINIMAL: &str = super::ODATA_MINIMAL;
}
