// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation
//!
//! [`HttpClient::execute`] is the request lifecycle: fingerprint, supersede
//! any identical request still in flight, run the hook chain, race the
//! transport against cancellation, release the registry slot, classify.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::cookie::CookieJar;
use super::headers;
use super::request::{CredentialsMode, Request, RequestBody};
use super::response::Response;
use crate::config::ClientConfig;
use crate::dedup::{cancel_pair, canonical_query, Fingerprint, PendingGuard, PendingRegistry};
use crate::error::{Error, NormalizedError, Result};
use crate::intercept::{
    classify_failure, classify_response, CsrfTokenInjector, HookAction, HookChain, Rejection,
    RequestHook, RequestLogger, RequestedWithMarker, Verdict,
};
use crate::notify::{
    DelayedNotice, LogReauthenticator, Notifier, Reauthenticator, TracingNotifier,
};

/// Why the transport did not produce a response
enum SendFailure {
    /// Superseded by a newer identical request
    Cancelled(Fingerprint),
    /// Network error, timeout, redirect loop...
    Transport(reqwest::Error),
}

/// Deduplicating HTTP client
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    cookie_jar: CookieJar,
    pending: Arc<PendingRegistry>,
    hooks: Arc<HookChain>,
    notifier: Arc<dyn Notifier>,
    reauthenticator: Arc<dyn Reauthenticator>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start building a client
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Get the cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Get the registry of in-flight requests
    pub fn pending(&self) -> &PendingRegistry {
        &self.pending
    }

    /// Cancel every request in flight
    pub fn cancel_all(&self) -> usize {
        self.pending.cancel_all()
    }

    /// Get client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a GET request
    pub async fn get(&self, path: impl Into<String>) -> Result<Value> {
        self.execute(Request::get(path)).await
    }

    /// Execute a POST request with a JSON body
    pub async fn post<T: Serialize>(&self, path: impl Into<String>, body: &T) -> Result<Value> {
        self.execute(Request::post(path).json(body)?).await
    }

    /// Execute a PUT request with a JSON body
    pub async fn put<T: Serialize>(&self, path: impl Into<String>, body: &T) -> Result<Value> {
        self.execute(Request::put(path).json(body)?).await
    }

    /// Execute a DELETE request
    pub async fn delete(&self, path: impl Into<String>) -> Result<Value> {
        self.execute(Request::delete(path)).await
    }

    /// Create a request builder
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            client: self.clone(),
            request: Request::new(method, path),
        }
    }

    /// Execute a request and classify its outcome
    pub async fn execute(&self, mut request: Request) -> Result<Value> {
        let url = self.config.resolve(&request.path)?;
        let fingerprint = Fingerprint::of(
            &request.method,
            url.as_str(),
            request.query.as_ref(),
            request.body.as_ref(),
        );

        // Exempt requests never touch the registry
        let (signal, guard) = if request.dedupe {
            let (handle, signal) = cancel_pair();
            let slot = self.pending.dispatch(fingerprint.clone(), handle);
            let guard = PendingGuard::new(&self.pending, fingerprint, slot);
            (Some(signal), Some(guard))
        } else {
            (None, None)
        };

        if let HookAction::Abort(reason) = self.hooks.process_request(&mut request).await {
            let error = self.reject(Rejection {
                message: reason,
                status: None,
                data: None,
            });
            self.hooks.notify_error(&request, &error).await;
            return Err(error);
        }

        let body = request.body.as_ref().map(RequestBody::to_bytes).transpose()?;
        let wire_url = with_query(url.clone(), request.query.as_ref());
        let send = self.send(&request, wire_url, body);

        let outcome = match signal {
            Some(signal) => {
                tokio::select! {
                    biased;
                    reason = signal.cancelled() => Err(SendFailure::Cancelled(reason)),
                    result = send => result.map_err(SendFailure::Transport),
                }
            }
            None => send.await.map_err(SendFailure::Transport),
        };
        drop(guard);

        let result = match outcome {
            Ok(mut response) if response.is_success() => {
                match self.hooks.process_response(&request, &mut response).await {
                    Ok(()) => self.settle(classify_response(&response, &self.config.messages)),
                    Err(err) => Err(err),
                }
            }
            Ok(response) => {
                tracing::debug!(url = %url, status = %response.status, "Request failed");
                self.settle(classify_failure(
                    Some(response.status_code()),
                    url.as_str(),
                    response.data(),
                    &self.config.messages,
                ))
            }
            Err(SendFailure::Cancelled(fingerprint)) => {
                tracing::debug!(url = %url, "Cancelled duplicate request");
                Err(Error::Cancelled { fingerprint })
            }
            Err(SendFailure::Transport(err)) => {
                tracing::warn!(url = %url, error = %err, timeout = err.is_timeout(), "Transport error");
                self.settle(classify_failure(
                    err.status().map(|s| s.as_u16()),
                    url.as_str(),
                    None,
                    &self.config.messages,
                ))
            }
        };

        if let Err(ref error) = result {
            self.hooks.notify_error(&request, error).await;
        }
        result
    }

    /// Execute multiple requests concurrently
    pub async fn execute_all(&self, requests: Vec<Request>) -> Vec<Result<Value>> {
        let futures: Vec<_> = requests.into_iter().map(|r| self.execute(r)).collect();
        futures::future::join_all(futures).await
    }

    async fn send(
        &self,
        request: &Request,
        url: Url,
        body: Option<Bytes>,
    ) -> std::result::Result<Response, reqwest::Error> {
        let start = Instant::now();

        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .headers(request.headers.clone());

        if !request.headers.contains_key(headers::CONTENT_TYPE) {
            if let Some(content_type) = request.body.as_ref().and_then(RequestBody::content_type) {
                builder = builder.header(headers::CONTENT_TYPE, content_type);
            }
        }

        let credentialed = self.sends_credentials(request, &url);
        if credentialed {
            if let Some(cookie_header) = self.cookie_jar.get_cookie_header(&url) {
                builder = builder.header(headers::COOKIE, cookie_header);
            }
        }

        if let Some(body) = body {
            builder = builder.body(body);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let response_time = start.elapsed().as_millis() as u64;

        let redirected = response.url() != &url;
        let final_url = response.url().clone();
        let status = response.status();
        let response_headers = response.headers().clone();
        let body = response.bytes().await?;

        let response = Response::new(
            status,
            response_headers,
            body,
            final_url,
            redirected,
            response_time,
        );

        if credentialed {
            for cookie in response.set_cookies() {
                self.cookie_jar.add_from_header(cookie, &response.url);
            }
        }

        Ok(response)
    }

    fn sends_credentials(&self, request: &Request, url: &Url) -> bool {
        let default_mode = if self.config.with_credentials {
            CredentialsMode::Include
        } else {
            CredentialsMode::SameOrigin
        };

        match request.credentials.unwrap_or(default_mode) {
            CredentialsMode::Include => true,
            CredentialsMode::Omit => false,
            CredentialsMode::SameOrigin => match &self.config.base_url {
                Some(base) => base.origin() == url.origin(),
                None => true,
            },
        }
    }

    fn settle(&self, verdict: Verdict) -> Result<Value> {
        match verdict {
            Verdict::Resolve(value) => Ok(value),
            Verdict::Reject(rejection) => Err(self.reject(rejection)),
            Verdict::Reauthenticate { login_url } => {
                self.reauthenticator.reauthenticate(login_url.as_deref());
                Err(Error::ReauthRequired { login_url })
            }
            Verdict::Silent { reason } => {
                tracing::warn!(reason = %reason, "Request rejected without notice");
                Err(Error::PermissionDenied)
            }
        }
    }

    fn reject(&self, rejection: Rejection) -> Error {
        let notice = DelayedNotice::schedule(
            self.notifier.clone(),
            rejection.message.clone(),
            self.config.notice_delay,
        );
        Error::Rejected(NormalizedError::new(
            rejection.message,
            rejection.status,
            rejection.data,
            notice,
        ))
    }
}

/// Append canonical query parameters to a URL, keeping any query it has
fn with_query(mut url: Url, query: Option<&Value>) -> Url {
    let encoded = query.map(canonical_query).unwrap_or_default();
    if encoded.is_empty() {
        return url;
    }

    let merged = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, encoded),
        _ => encoded,
    };
    url.set_query(Some(&merged));
    url
}

/// Builder for [`HttpClient`]
pub struct ClientBuilder {
    config: ClientConfig,
    hooks: HookChain,
    standard_hooks: bool,
    cookie_jar: Option<CookieJar>,
    notifier: Arc<dyn Notifier>,
    reauthenticator: Arc<dyn Reauthenticator>,
}

impl ClientBuilder {
    /// Create a builder with the standard hooks, a log notifier and a log
    /// reauthenticator
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            hooks: HookChain::new(),
            standard_hooks: true,
            cookie_jar: None,
            notifier: Arc::new(TracingNotifier),
            reauthenticator: Arc::new(LogReauthenticator),
        }
    }

    /// Add a hook
    pub fn hook<H: RequestHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.add(hook);
        self
    }

    /// Leave out the anti-forgery, XHR marker and logging hooks
    pub fn without_standard_hooks(mut self) -> Self {
        self.standard_hooks = false;
        self
    }

    /// Share an existing cookie jar
    pub fn cookie_jar(mut self, jar: CookieJar) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Set the notification sink
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set the re-authentication trigger
    pub fn reauthenticator(mut self, reauthenticator: Arc<dyn Reauthenticator>) -> Self {
        self.reauthenticator = reauthenticator;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HttpClient> {
        let config = self.config;
        let cookie_jar = self.cookie_jar.unwrap_or_default();

        let mut hooks = self.hooks;
        if self.standard_hooks {
            hooks.add(CsrfTokenInjector::new(
                cookie_jar.clone(),
                config.csrf_cookie_name.clone(),
                config.csrf_header.clone(),
            ));
            hooks.add(RequestedWithMarker::new(config.requested_with.clone()));
            hooks.add(RequestLogger::default());
        }

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(10))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(false); // We handle cookies ourselves

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(HttpClient {
            client: builder.build()?,
            config,
            cookie_jar,
            pending: Arc::new(PendingRegistry::new()),
            hooks: Arc::new(hooks),
            notifier: self.notifier,
            reauthenticator: self.reauthenticator,
        })
    }
}

/// Builder for executing requests with the client
pub struct RequestBuilder {
    client: HttpClient,
    request: Request,
}

impl RequestBuilder {
    /// Set a header
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Set query parameters
    pub fn query<T: Serialize>(mut self, params: &T) -> Result<Self> {
        self.request = self.request.query(params)?;
        Ok(self)
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.request = self.request.json(data)?;
        Ok(self)
    }

    /// Set form body
    pub fn form<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.request = self.request.form(data)?;
        Ok(self)
    }

    /// Set raw body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request = self.request.timeout(timeout);
        self
    }

    /// Exempt from duplicate suppression
    pub fn no_dedupe(mut self) -> Self {
        self.request = self.request.no_dedupe();
        self
    }

    /// Skip the anti-forgery header
    pub fn no_csrf(mut self) -> Self {
        self.request = self.request.no_csrf();
        self
    }

    /// Execute the request
    pub async fn send(self) -> Result<Value> {
        self.client.execute(self.request).await
    }
}
