//! axum middleware that runs every request through the `AuthGate`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use url::form_urlencoded;

use knock_core::client_identity;
use knock_services::{AuthGate, Decision, GateError};

/// Query parameter carrying the shared secret.
pub const KEY_PARAM: &str = "key";

pub async fn knock(
    State(gate): State<Arc<AuthGate>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Response {
    let remote = remote.to_string();
    let identity = client_identity(&remote);

    let cookie = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| gate.cookie_name().find_in(v))
        .map(str::to_owned);

    let query = request.uri().query().unwrap_or_default();
    let key = query_param(query, KEY_PARAM);

    // The secret must never reach the protected stage.
    if key.is_some() {
        let stripped = strip_query_param(query, KEY_PARAM);
        match with_query(request.uri(), &stripped) {
            Ok(uri) => *request.uri_mut() = uri,
            Err(e) => {
                tracing::error!(error = %e, "failed to rewrite request uri");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    match gate.decide(identity, cookie.as_deref(), key.as_deref()).await {
        Ok(Decision::Admit) => next.run(request).await,
        Ok(Decision::Issue { token }) => {
            let cookie = match HeaderValue::from_str(&gate.cookie_name().set_cookie(&token)) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(error = %e, "unencodable session cookie");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            let mut response = next.run(request).await;
            response.headers_mut().append(header::SET_COOKIE, cookie);
            response
        }
        Err(e) => rejection(&e),
    }
}

/// HTTP status for a gate failure.
pub fn status_for(err: &GateError) -> StatusCode {
    if err.is_rejection() {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn rejection(err: &GateError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        (status, "internal error").into_response()
    } else {
        (status, err.to_string()).into_response()
    }
}

/// First value of `name` in a raw query string, percent-decoded.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Remove every `name` pair from `query`, leaving all other pairs byte-for-byte.
pub fn strip_query_param(query: &str, name: &str) -> String {
    query
        .split('&')
        .filter(|pair| {
            form_urlencoded::parse(pair.as_bytes())
                .next()
                .map_or(true, |(k, _)| k != name)
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn with_query(uri: &Uri, query: &str) -> Result<Uri, axum::http::Error> {
    let path = uri.path();
    let path_and_query = if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse()?);
    Ok(Uri::from_parts(parts)?)
}
