// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

/// HTTP response representation
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    /// Whether this was a redirect
    pub redirected: bool,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

impl Response {
    /// Create a new response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        redirected: bool,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            response_time_ms,
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body as data for error reports: JSON when it parses, text otherwise,
    /// nothing when empty
    pub fn data(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        Some(
            serde_json::from_slice(&self.body)
                .unwrap_or_else(|_| Value::String(self.text_lossy())),
        )
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all(super::headers::SET_COOKIE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, body: &'static str) -> Response {
        Response::new(
            status,
            HeaderMap::new(),
            Bytes::from(body),
            Url::parse("https://example.com").unwrap(),
            false,
            100,
        )
    }

    #[test]
    fn test_response_status() {
        let resp = response(StatusCode::OK, "");
        assert!(resp.is_success());
        assert_eq!(resp.status_code(), 200);
        assert!(resp.data().is_none());
    }

    #[test]
    fn test_response_data() {
        let resp = response(StatusCode::NOT_FOUND, r#"{"detail":"missing"}"#);
        assert_eq!(resp.data().unwrap()["detail"], "missing");

        let resp = response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(resp.data(), Some(Value::String("<html>bad gateway</html>".into())));
    }

    #[test]
    fn test_set_cookies() {
        let mut resp = response(StatusCode::OK, "");
        resp.headers.append("set-cookie", "a=1; Path=/".parse().unwrap());
        resp.headers.append("set-cookie", "b=2".parse().unwrap());
        resp.headers.append("x-other", "c=3".parse().unwrap());
        assert_eq!(resp.set_cookies(), vec!["a=1; Path=/", "b=2"]);
    }
}
