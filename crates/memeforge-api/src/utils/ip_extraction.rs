//! Client IP resolution
//!
//! The cooldown and both rate limiters are keyed by client IP, so it has to survive a reverse
//! proxy without trusting a spoofed `X-Forwarded-For` chain.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Resolve the client IP from request headers and the peer address.
///
/// Each of our `trusted_proxy_count` proxies appends the address it received the connection
/// from, so the client is the Nth entry from the end of `X-Forwarded-For`. Anything before it was
/// written by the client and is ignored. With no trusted proxies the forwarding headers are
/// ignored entirely and the socket address is used. Falls back to `"unknown"`.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if trusted_proxy_count > 0 {
        if let Some(forwarded_for) = headers.get("x-forwarded-for") {
            if let Ok(header_value) = forwarded_for.to_str() {
                if let Some(ip) = extract_from_forwarded_for(header_value, trusted_proxy_count) {
                    return ip;
                }
            }
        }

        if let Some(real_ip) = headers.get("x-real-ip") {
            if let Ok(header_value) = real_ip.to_str() {
                let trimmed = header_value.trim();
                if is_valid_ip(trimmed) {
                    return trimmed.to_string();
                }
            }
        }
    }

    if let Some(addr) = socket_addr {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

fn extract_from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    if trusted_proxy_count == 0 {
        return None;
    }

    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    // A shorter chain than expected means the outermost entry is the furthest we can see
    let candidate = match ips.len().checked_sub(trusted_proxy_count) {
        Some(index) => ips.get(index)?,
        None => ips.first()?,
    };

    is_valid_ip(candidate).then(|| candidate.to_string())
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}
