// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Pre-request / post-response hooks
//!
//! Hooks run in priority order around every request the client executes.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::http::{CookieJar, Request, Response};

/// Request hook trait
///
/// # Example
///
/// ```rust,no_run
/// use xhrgate::intercept::{HookAction, RequestHook};
/// use xhrgate::http::Request;
/// use async_trait::async_trait;
///
/// struct TenantHeader {
///     tenant: String,
/// }
///
/// #[async_trait]
/// impl RequestHook for TenantHeader {
///     async fn before_request(&self, req: &mut Request) -> HookAction {
///         req.headers.insert("x-tenant", self.tenant.parse().unwrap());
///         HookAction::Continue
///     }
/// }
/// ```
#[async_trait]
#[allow(unused_variables)]
pub trait RequestHook: Send + Sync {
    /// Called before a request is sent. Can modify the request or abort it.
    async fn before_request(&self, request: &mut Request) -> HookAction {
        HookAction::Continue
    }

    /// Called after a 2xx response is received
    async fn after_response(&self, request: &Request, response: &mut Response) -> Result<()> {
        Ok(())
    }

    /// Called when a request settles with an error, cancellations included
    async fn on_error(&self, request: &Request, error: &Error) {}

    /// Filter - return true if this hook should handle the request
    fn should_intercept(&self, request: &Request) -> bool {
        true
    }

    /// Priority - higher priority hooks run first
    fn priority(&self) -> i32 {
        0
    }
}

/// Action to take after a pre-request hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Continue with the (possibly modified) request
    Continue,
    /// Abort the request; the reason becomes the rejection message
    Abort(String),
}

fn insert_header(request: &mut Request, name: &str, value: &str) {
    if let (Ok(name), Ok(value)) = (name.parse::<HeaderName>(), HeaderValue::from_str(value)) {
        request.headers.insert(name, value);
    }
}

/// Attaches the anti-forgery token read from the cookie jar
pub struct CsrfTokenInjector {
    jar: CookieJar,
    cookie_name: String,
    header: String,
}

impl CsrfTokenInjector {
    /// Create an injector reading `cookie_name` and writing `header`
    pub fn new(jar: CookieJar, cookie_name: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            jar,
            cookie_name: cookie_name.into(),
            header: header.into(),
        }
    }
}

#[async_trait]
impl RequestHook for CsrfTokenInjector {
    fn should_intercept(&self, request: &Request) -> bool {
        request.csrf && !request.is_safe_method()
    }

    async fn before_request(&self, request: &mut Request) -> HookAction {
        // Missing token is sent as an empty header
        let token = self.jar.value(&self.cookie_name).unwrap_or_default();
        let value = HeaderValue::from_str(&token).unwrap_or_else(|_| {
            tracing::warn!(
                cookie = %self.cookie_name,
                "Anti-forgery token is not a valid header value, sending it empty"
            );
            HeaderValue::from_static("")
        });

        match self.header.parse::<HeaderName>() {
            Ok(name) => {
                request.headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %self.header, "Invalid anti-forgery header name"),
        }
        HookAction::Continue
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Marks every request as an XHR
pub struct RequestedWithMarker {
    value: String,
}

impl RequestedWithMarker {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Default for RequestedWithMarker {
    fn default() -> Self {
        Self::new("XMLHttpRequest")
    }
}

#[async_trait]
impl RequestHook for RequestedWithMarker {
    async fn before_request(&self, request: &mut Request) -> HookAction {
        insert_header(request, crate::http::headers::X_REQUESTED_WITH, &self.value);
        HookAction::Continue
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Auth header injector
#[derive(Default)]
pub struct AuthHeaderInjector {
    /// Headers to inject into every request
    headers: Vec<(String, String)>,
    /// Domains to inject into (empty = all)
    domains: Vec<String>,
}

impl AuthHeaderInjector {
    /// Create a new auth header injector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bearer token
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.headers
            .push(("authorization".into(), format!("Bearer {}", token.into())));
        self
    }

    /// Add basic auth
    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        let encoded = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            format!("{}:{}", username, password),
        );
        self.headers
            .push(("authorization".into(), format!("Basic {}", encoded)));
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Restrict to specific domains
    pub fn for_domains(mut self, domains: Vec<String>) -> Self {
        self.domains = domains;
        self
    }
}

#[async_trait]
impl RequestHook for AuthHeaderInjector {
    fn should_intercept(&self, request: &Request) -> bool {
        if self.domains.is_empty() {
            return true;
        }

        url::Url::parse(&request.path)
            .ok()
            .and_then(|url| url.host_str().map(String::from))
            .map(|host| self.domains.iter().any(|d| host.contains(d.as_str())))
            .unwrap_or(false)
    }

    async fn before_request(&self, request: &mut Request) -> HookAction {
        for (name, value) in &self.headers {
            insert_header(request, name, value);
        }
        HookAction::Continue
    }

    fn priority(&self) -> i32 {
        90
    }
}

/// Request logger hook
#[derive(Default)]
pub struct RequestLogger {
    /// Log response bodies
    pub log_responses: bool,
}

#[async_trait]
impl RequestHook for RequestLogger {
    async fn before_request(&self, request: &mut Request) -> HookAction {
        tracing::info!(method = %request.method, path = %request.path, "Request");
        HookAction::Continue
    }

    async fn after_response(&self, request: &Request, response: &mut Response) -> Result<()> {
        tracing::info!(
            path = %request.path,
            status = %response.status,
            redirected = response.redirected,
            time_ms = response.response_time_ms,
            "Response"
        );

        if self.log_responses {
            tracing::debug!(body = %response.text_lossy(), "Response body");
        }

        Ok(())
    }

    async fn on_error(&self, request: &Request, error: &Error) {
        if error.is_cancelled() {
            tracing::debug!(path = %request.path, "Cancelled duplicate request");
        } else {
            tracing::warn!(path = %request.path, error = %error, "Request failed");
        }
    }

    fn priority(&self) -> i32 {
        -100
    }
}

/// Hook chain - runs hooks by priority
#[derive(Default, Clone)]
pub struct HookChain {
    hooks: Vec<Arc<dyn RequestHook>>,
}

impl HookChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook
    pub fn add<H: RequestHook + 'static>(&mut self, hook: H) {
        self.hooks.push(Arc::new(hook));
        // Stable sort keeps insertion order among equal priorities
        self.hooks.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Number of hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run pre-request hooks; stops at the first abort
    pub async fn process_request(&self, request: &mut Request) -> HookAction {
        for hook in &self.hooks {
            if !hook.should_intercept(request) {
                continue;
            }

            match hook.before_request(request).await {
                HookAction::Continue => continue,
                action => return action,
            }
        }
        HookAction::Continue
    }

    /// Run post-response hooks
    pub async fn process_response(&self, request: &Request, response: &mut Response) -> Result<()> {
        for hook in &self.hooks {
            if hook.should_intercept(request) {
                hook.after_response(request, response).await?;
            }
        }
        Ok(())
    }

    /// Notify hooks of an error
    pub async fn notify_error(&self, request: &Request, error: &Error) {
        for hook in &self.hooks {
            if hook.should_intercept(request) {
                hook.on_error(request, error).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Cookie;
    use reqwest::Method;

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_csrf_token_injected() {
        let jar = CookieJar::new();
        jar.add(Cookie::new("csrftoken", "tok%3D1").domain("example.com"));

        let mut chain = HookChain::new();
        chain.add(CsrfTokenInjector::new(jar, "csrftoken", "X-CSRFToken"));
        chain.add(RequestedWithMarker::default());

        let mut request = Request::post("/items");
        assert_eq!(chain.process_request(&mut request).await, HookAction::Continue);
        assert_eq!(header(&request, "x-csrftoken"), Some("tok=1"));
        assert_eq!(header(&request, "x-requested-with"), Some("XMLHttpRequest"));
    }

    #[tokio::test]
    async fn test_missing_token_is_empty() {
        let mut chain = HookChain::new();
        chain.add(CsrfTokenInjector::new(CookieJar::new(), "csrftoken", "X-CSRFToken"));

        let mut request = Request::delete("/items/1");
        chain.process_request(&mut request).await;
        assert_eq!(header(&request, "x-csrftoken"), Some(""));
    }

    #[tokio::test]
    async fn test_unencodable_token_is_sent_empty() {
        let jar = CookieJar::new();
        jar.add(Cookie::new("csrftoken", "bad%0Atoken").domain("example.com"));

        let mut chain = HookChain::new();
        chain.add(CsrfTokenInjector::new(jar, "csrftoken", "X-CSRFToken"));

        let mut request = Request::put("/items/1");
        chain.process_request(&mut request).await;
        assert_eq!(header(&request, "x-csrftoken"), Some(""));
    }

    #[tokio::test]
    async fn test_safe_methods_and_exempt_requests_skip_token() {
        let mut chain = HookChain::new();
        chain.add(CsrfTokenInjector::new(CookieJar::new(), "csrftoken", "X-CSRFToken"));
        chain.add(RequestedWithMarker::default());

        let mut head = Request::new(Method::HEAD, "/items");
        chain.process_request(&mut head).await;
        assert_eq!(header(&head, "x-csrftoken"), None);
        assert_eq!(header(&head, "x-requested-with"), Some("XMLHttpRequest"));

        let mut exempt = Request::post("/items").no_csrf();
        chain.process_request(&mut exempt).await;
        assert_eq!(header(&exempt, "x-csrftoken"), None);
    }

    #[tokio::test]
    async fn test_auth_injector_domains() {
        let mut chain = HookChain::new();
        chain.add(
            AuthHeaderInjector::new()
                .bearer_token("secret")
                .for_domains(vec!["api.example.com".into()]),
        );

        let mut matching = Request::get("https://api.example.com/me");
        chain.process_request(&mut matching).await;
        assert_eq!(header(&matching, "authorization"), Some("Bearer secret"));

        let mut other = Request::get("https://cdn.example.org/file");
        chain.process_request(&mut other).await;
        assert_eq!(header(&other, "authorization"), None);
    }

    struct Refuse;

    #[async_trait]
    impl RequestHook for Refuse {
        async fn before_request(&self, _request: &mut Request) -> HookAction {
            HookAction::Abort("offline".into())
        }
    }

    #[tokio::test]
    async fn test_abort_stops_chain() {
        let mut chain = HookChain::new();
        chain.add(Refuse);
        chain.add(RequestLogger::default());
        assert_eq!(chain.len(), 2);

        let mut request = Request::get("/items");
        assert_eq!(
            chain.process_request(&mut request).await,
            HookAction::Abort("offline".into())
        );
    }
}
