use std::net::SocketAddr;

use axum::http::{header, HeaderMap};
use chrono::Local;
use linkhub_protocol::visitor::VisitorContext;

use crate::geoip::GeoResolver;

/// Derives the evaluation context from an inbound public request: client
/// IP (optionally honouring `x-forwarded-for`), user agent, device class,
/// resolved country and the server-local wall clock.
pub fn build_context(
    headers: &HeaderMap,
    remote_addr: SocketAddr,
    geo: &GeoResolver,
    trust_forwarded: bool,
) -> VisitorContext {
    let ip = client_ip(headers, remote_addr, trust_forwarded);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let country = geo.resolve(&ip);
    VisitorContext::new(Local::now().naive_local(), ip, user_agent, country)
}

/// Picks the client IP. The first `x-forwarded-for` entry is used only when
/// the deployment declares its proxy trusted; otherwise the socket's remote
/// address wins.
pub fn client_ip(headers: &HeaderMap, remote_addr: SocketAddr, trust_forwarded: bool) -> String {
    let forwarded = if trust_forwarded {
        headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    } else {
        None
    };

    normalize_ip(&forwarded.unwrap_or_else(|| remote_addr.ip().to_string()))
}

/// Normalizes textual addresses before geolocation: strips the IPv4-mapped
/// IPv6 prefix and maps IPv6 loopback onto `127.0.0.1` so local testing
/// behaves like the IPv4 path.
pub fn normalize_ip(raw: &str) -> String {
    let stripped = raw.strip_prefix("::ffff:").unwrap_or(raw);
    if stripped == "::1" {
        "127.0.0.1".to_string()
    } else {
        stripped.to_string()
    }
}
