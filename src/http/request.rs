// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request types

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::dedup::canonical_query;
use crate::error::Result;

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`
    Json(Value),
    /// Sent as `application/x-www-form-urlencoded`
    Form(Value),
    /// Sent as-is
    Raw(Bytes),
}

impl RequestBody {
    /// Encode the body for the wire
    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(match self {
            RequestBody::Json(value) => Bytes::from(serde_json::to_vec(value)?),
            RequestBody::Form(value) => Bytes::from(canonical_query(value)),
            RequestBody::Raw(bytes) => bytes.clone(),
        })
    }

    /// Content type implied by the body kind
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
            RequestBody::Raw(_) => None,
        }
    }
}

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Absolute URL, or a path resolved against the client's base URL
    pub path: String,
    /// Query parameters
    pub query: Option<Value>,
    /// Request body
    pub body: Option<RequestBody>,
    /// Request headers
    pub headers: HeaderMap,
    /// Request timeout (client default when unset)
    pub timeout: Option<Duration>,
    /// Credentials mode (client default when unset)
    pub credentials: Option<CredentialsMode>,
    /// Take part in duplicate suppression
    pub dedupe: bool,
    /// Attach the anti-forgery header
    pub csrf: bool,
}

/// Credentials mode for requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsMode {
    /// Send credentials only to same-origin requests
    #[default]
    SameOrigin,
    /// Always send credentials
    Include,
    /// Never send credentials
    Omit,
}

impl Request {
    /// Create a new request with arbitrary method
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            headers: HeaderMap::new(),
            timeout: None,
            credentials: None,
            dedupe: true,
            csrf: true,
        }
    }

    /// Create a new GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a new POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a new PUT request
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a new DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a header
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set query parameters from any serializable value
    pub fn query<T: Serialize>(mut self, params: &T) -> Result<Self> {
        self.query = Some(serde_json::to_value(params)?);
        Ok(self)
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(data)?));
        Ok(self)
    }

    /// Set form body
    pub fn form<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.body = Some(RequestBody::Form(serde_json::to_value(data)?));
        Ok(self)
    }

    /// Set raw body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set credentials mode
    pub fn credentials(mut self, mode: CredentialsMode) -> Self {
        self.credentials = Some(mode);
        self
    }

    /// Exempt from duplicate suppression: never cancelled by a follow-up,
    /// never cancels a predecessor
    pub fn no_dedupe(mut self) -> Self {
        self.dedupe = false;
        self
    }

    /// Skip the anti-forgery header
    pub fn no_csrf(mut self) -> Self {
        self.csrf = false;
        self
    }

    /// Check if the method carries no body by convention
    pub fn is_safe_method(&self) -> bool {
        [Method::HEAD, Method::OPTIONS, Method::TRACE].contains(&self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_creation() {
        let req = Request::get("/api/items");
        assert_eq!(req.method, Method::GET);
        assert!(req.dedupe);
        assert!(req.csrf);
        assert!(req.body.is_none());
    }

    #[test]
    fn test_exemption_flags_are_independent() {
        let req = Request::post("/a").no_dedupe();
        assert!(!req.dedupe);
        assert!(req.csrf);

        let req = Request::post("/a").no_csrf();
        assert!(req.dedupe);
        assert!(!req.csrf);
    }

    #[test]
    fn test_request_headers() {
        let req = Request::get("/a").header("x-custom", "value");
        assert_eq!(
            req.headers.get("x-custom").map(|v| v.to_str().unwrap()),
            Some("value")
        );
    }

    #[test]
    fn test_body_encoding() {
        let req = Request::post("/a").form(&json!({"b": 2, "a": "x y"})).unwrap();
        let body = req.body.unwrap();
        assert_eq!(body.to_bytes().unwrap(), Bytes::from("a=x%20y&b=2"));
        assert_eq!(body.content_type(), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn test_safe_methods() {
        assert!(Request::new(Method::HEAD, "/").is_safe_method());
        assert!(Request::new(Method::OPTIONS, "/").is_safe_method());
        assert!(!Request::get("/").is_safe_method());
        assert!(!Request::post("/").is_safe_method());
    }
}
