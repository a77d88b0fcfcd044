//! Request authority and client address extraction.

use std::net::{IpAddr, SocketAddr};

use axum::http::{HeaderMap, header};

/// Returns the lowercased authority (`host[:port]`) the request was sent to.
///
/// With `behind_proxy`, `X-Forwarded-Host` takes precedence over `Host`.
/// Returns `None` when no usable header is present.
pub fn extract_authority(headers: &HeaderMap, behind_proxy: bool) -> Option<String> {
    let forwarded = behind_proxy
        .then(|| headers.get("x-forwarded-host"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());

    let host = forwarded.or_else(|| headers.get(header::HOST)?.to_str().ok())?;
    let host = host.trim();

    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}

/// Client IP of a request.
///
/// With `behind_proxy`, the first valid address of `X-Forwarded-For` (then
/// `X-Real-IP`) wins over the socket peer address.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> IpAddr {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .or_else(|| headers.get("x-real-ip")?.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        if let Some(ip) = forwarded {
            return ip;
        }
    }

    peer.ip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_extract_authority_keeps_port() {
        let h = headers(&[("host", "S.Example.com:8080")]);
        assert_eq!(
            extract_authority(&h, false).as_deref(),
            Some("s.example.com:8080")
        );
    }

    #[test]
    fn test_extract_authority_missing_host() {
        assert!(extract_authority(&HeaderMap::new(), false).is_none());
    }

    #[test]
    fn test_forwarded_host_only_behind_proxy() {
        let h = headers(&[("host", "internal:3000"), ("x-forwarded-host", "s.test, proxy")]);

        assert_eq!(extract_authority(&h, true).as_deref(), Some("s.test"));
        assert_eq!(extract_authority(&h, false).as_deref(), Some("internal:3000"));
    }

    #[test]
    fn test_extract_authority_invalid_utf8() {
        let mut h = HeaderMap::new();
        h.insert(header::HOST, HeaderValue::from_bytes(b"\xff\xfe").unwrap());
        assert!(extract_authority(&h, false).is_none());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for_behind_proxy() {
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.2")]);

        assert_eq!(client_ip(&h, peer, true).to_string(), "203.0.113.7");
        assert_eq!(client_ip(&h, peer, false).to_string(), "10.0.0.1");
    }

    #[test]
    fn test_client_ip_ignores_garbage_header() {
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let h = headers(&[("x-forwarded-for", "unknown"), ("x-real-ip", "198.51.100.4")]);

        assert_eq!(client_ip(&h, peer, true).to_string(), "10.0.0.1");
    }
}
