//! Visitor session cookie
//!
//! Every visitor receives a signed session id on first contact. The value has the form
//! `<session id>.<hex HMAC-SHA256 of the id>` keyed by `SESSION_SECRET`; cookies that fail
//! verification are replaced with a fresh session.

use crate::constants::{SESSION_COOKIE_NAME, SESSION_MAX_AGE_SECS};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Session id attached to request extensions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisitorSession(pub String);

#[derive(Clone)]
pub struct SessionConfig {
    secret: Arc<str>,
    secure: bool,
}

impl SessionConfig {
    pub fn new(secret: &str, secure: bool) -> Self {
        Self {
            secret: Arc::from(secret),
            secure,
        }
    }

    fn signature(&self, session_id: &str) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(session_id.as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// Produce the cookie value for a session id
    pub fn sign(&self, session_id: &str) -> Option<String> {
        self.signature(session_id)
            .map(|signature| format!("{}.{}", session_id, signature))
    }

    /// Return the session id if the cookie value carries a valid signature
    pub fn verify(&self, cookie_value: &str) -> Option<String> {
        let (session_id, signature) = cookie_value.rsplit_once('.')?;
        if session_id.is_empty() {
            return None;
        }
        let expected = self.signature(session_id)?;
        let valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();
        valid.then(|| session_id.to_string())
    }

    fn set_cookie_header(&self, cookie_value: &str) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE_NAME, cookie_value, SESSION_MAX_AGE_SECS
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }
}

/// Find a cookie by name across all `Cookie` headers
fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub async fn session_middleware(
    State(config): State<Arc<SessionConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = find_cookie(request.headers(), SESSION_COOKIE_NAME)
        .and_then(|value| config.verify(value));

    let (session_id, is_new) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4().simple().to_string(), true),
    };

    request
        .extensions_mut()
        .insert(VisitorSession(session_id.clone()));

    let mut response = next.run(request).await;

    if is_new {
        match config
            .sign(&session_id)
            .and_then(|value| config.set_cookie_header(&value))
        {
            Some(header_value) => {
                tracing::debug!(session_id = %session_id, "Issued visitor session");
                response
                    .headers_mut()
                    .append(header::SET_COOKIE, header_value);
            }
            None => tracing::warn!("Failed to build session cookie"),
        }
    }

    response
}
