//! Request inspection.
//!
//! # Responsibilities
//! - Extract routing-relevant information (scheme, host, port, path)
//! - Provide request ID layers for tracing
//!
//! # Design Decisions
//! - The Host header wins over the URI authority (HTTP/1.1 origin-form
//!   requests carry no authority)
//! - `X-Forwarded-Proto` is only honoured when the listener trusts it
//! - A missing port stays `None`; host matching treats it as "any port"

use axum::http::header::{HeaderMap, HOST};
use axum::http::uri::Authority;
use axum::http::{HeaderName, Uri};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::config::ListenerConfig;
use crate::routing::RequestTarget;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Assigns an `x-request-id` to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Request ID assigned by [`set_request_id_layer`], or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

impl RequestTarget {
    /// Describe an inbound request for frontend selection.
    pub fn from_request_parts(uri: &Uri, headers: &HeaderMap, listener: &ListenerConfig) -> Self {
        let scheme = request_scheme(uri, headers, listener);

        let authority = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<Authority>().ok())
            .or_else(|| uri.authority().cloned());

        let (host, port) = match &authority {
            Some(authority) => (authority.host().to_ascii_lowercase(), authority.port_u16()),
            None => (String::new(), None),
        };

        Self {
            scheme,
            host,
            port,
            path: uri.path().to_string(),
        }
    }
}

fn request_scheme(uri: &Uri, headers: &HeaderMap, listener: &ListenerConfig) -> String {
    if listener.trust_forwarded_proto {
        // First hop only when proxies append.
        let forwarded = headers
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(proto) = forwarded {
            return proto.to_ascii_lowercase();
        }
    }

    uri.scheme_str()
        .unwrap_or(listener.default_scheme.as_str())
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_host_header_with_port() {
        let uri: Uri = "/app/page".parse().unwrap();
        let target = RequestTarget::from_request_parts(
            &uri,
            &headers(&[("host", "Shop.Example.com:8443")]),
            &ListenerConfig::default(),
        );

        assert_eq!(target, RequestTarget::new("http", "shop.example.com", Some(8443), "/app/page"));
    }

    #[test]
    fn test_missing_port_stays_unset() {
        let uri: Uri = "https://shop.example.com/x".parse().unwrap();
        let target = RequestTarget::from_request_parts(&uri, &HeaderMap::new(), &ListenerConfig::default());

        assert_eq!(target.scheme, "https");
        assert_eq!(target.host, "shop.example.com");
        assert_eq!(target.port, None);

        let uri: Uri = "/x".parse().unwrap();
        let explicit = RequestTarget::from_request_parts(
            &uri,
            &headers(&[("host", "shop.example.com:443")]),
            &ListenerConfig::default(),
        );
        assert_eq!(explicit.port, Some(443));
    }

    #[test]
    fn test_forwarded_proto() {
        let uri: Uri = "/".parse().unwrap();
        let map = headers(&[("host", "a.example.com"), ("x-forwarded-proto", "HTTPS, http")]);

        let untrusted = RequestTarget::from_request_parts(&uri, &map, &ListenerConfig::default());
        assert_eq!(untrusted.scheme, "http");
        assert_eq!(untrusted.port, None);

        let listener = ListenerConfig {
            trust_forwarded_proto: true,
            ..Default::default()
        };
        let trusted = RequestTarget::from_request_parts(&uri, &map, &listener);
        assert_eq!(trusted.scheme, "https");
        assert_eq!(trusted.port, None);
    }

    #[test]
    fn test_missing_host() {
        let uri: Uri = "/only/path".parse().unwrap();
        let target = RequestTarget::from_request_parts(&uri, &HeaderMap::new(), &ListenerConfig::default());

        assert!(target.host.is_empty());
        assert_eq!(target.port, None);
        assert_eq!(target.path, "/only/path");
    }

    #[test]
    fn test_request_id_fallback() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
        assert_eq!(request_id(&headers(&[("x-request-id", "abc")])), "abc");
    }
}
