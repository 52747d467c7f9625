use crate::utils::ip_extraction::extract_client_ip;
use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Resolved client IP, stored in request extensions by [`client_ip_middleware`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Number of reverse proxies in front of the server
#[derive(Clone, Copy, Debug)]
pub struct TrustedProxies(pub usize);

/// Resolve the client IP once per request so limiters and handlers agree on the key
pub async fn client_ip_middleware(
    State(trusted): State<TrustedProxies>,
    mut request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = extract_client_ip(request.headers(), socket_addr.as_ref(), trusted.0);
    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}

/// Read the resolved IP from request extensions, falling back to `"unknown"`.
pub fn client_ip_of(extensions: &axum::http::Extensions) -> ClientIp {
    extensions
        .get::<ClientIp>()
        .cloned()
        .unwrap_or_else(|| ClientIp("unknown".to_string()))
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(client_ip_of(&parts.extensions))
    }
}
