//! knock integration test harness.
//!
//! Drives the gated router in-process: requests are built by hand, tagged
//! with a client address, and sent through `tower::ServiceExt::oneshot`.
//! The protected stage echoes the URI it received so tests can see exactly
//! what got past the gate.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode, Uri};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use knock_core::cookie::DEFAULT_COOKIE_PREFIX;
use knock_core::secret::hash_secret;
use knock_core::{Argon2Verifier, CookieName};
use knock_services::{AuthGate, SessionStore};

mod sweep;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const SECRET: &str = "let me in";
pub const CLIENT_A: &str = "203.0.113.5:41000";
pub const CLIENT_B: &str = "203.0.113.9:41000";

/// Hashing is slow; do it once for the whole run.
fn secret_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_secret(SECRET).expect("hash secret"))
}

pub struct Harness {
    pub app: Router,
    pub gate: Arc<AuthGate>,
    pub store: SessionStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_hash(secret_hash())
    }

    pub fn with_hash(hash: &str) -> Self {
        let store = SessionStore::new();
        let gate = Arc::new(AuthGate::new(
            store.clone(),
            Arc::new(Argon2Verifier),
            hash,
            CookieName::generate(DEFAULT_COOKIE_PREFIX).expect("cookie name"),
        ));
        let upstream = Router::new()
            .route("/", get(echo_uri))
            .route("/files/{name}", get(echo_uri));
        let app = knock_api::protect(upstream, gate.clone());
        Self { app, gate, store }
    }

    pub fn cookie_name(&self) -> String {
        self.gate.cookie_name().to_string()
    }

    /// Send a GET from `client`, optionally carrying a raw `Cookie` header.
    pub async fn get(&self, client: &str, uri: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let mut req = req.body(Body::empty()).unwrap();
        let addr: SocketAddr = client.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.app.clone().oneshot(req).await.unwrap()
    }

    /// Send a GET carrying this gate's session cookie with `token`.
    pub async fn get_with_session(&self, client: &str, uri: &str, token: &str) -> Response {
        let cookie = format!("{}={}", self.cookie_name(), token);
        self.get(client, uri, Some(&cookie)).await
    }
}

async fn echo_uri(uri: Uri) -> String {
    uri.to_string()
}

pub async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Token from the response's `Set-Cookie`, if the gate issued one.
pub fn issued_token(resp: &Response, cookie_name: &str) -> Option<String> {
    let value = resp.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = value.split(';').next()?;
    let (name, token) = pair.split_once('=')?;
    (name == cookie_name).then(|| token.to_string())
}

/// Issue a session for `client` via the key and return its token.
pub async fn login(h: &Harness, client: &str) -> String {
    let resp = h.get(client, &format!("/?key={}", SECRET.replace(' ', "+")), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    issued_token(&resp, &h.cookie_name()).expect("session cookie issued")
}
