// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client configuration

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::intercept::{Locale, StatusMessages};
use crate::notify::DEFAULT_NOTICE_DELAY;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("xhrgate/", env!("CARGO_PKG_VERSION"));

/// Environment variable names read by [`ClientConfig::from_env`]
pub mod env_keys {
    pub const BASE_URL: &str = "XHRGATE_BASE_URL";
    pub const TIMEOUT_SECS: &str = "XHRGATE_TIMEOUT_SECS";
    pub const WITH_CREDENTIALS: &str = "XHRGATE_WITH_CREDENTIALS";
    pub const CSRF_COOKIE: &str = "XHRGATE_CSRF_COOKIE";
    pub const LOCALE: &str = "XHRGATE_LOCALE";
    pub const PROXY: &str = "XHRGATE_PROXY";
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL relative request paths are resolved against
    pub base_url: Option<Url>,
    /// Upper bound for a whole request
    pub timeout: Duration,
    /// Send cookies with cross-origin requests too
    pub with_credentials: bool,
    /// Name of the cookie holding the anti-forgery token
    pub csrf_cookie_name: String,
    /// Header the anti-forgery token is sent in
    pub csrf_header: String,
    /// Value of the `X-Requested-With` marker
    pub requested_with: String,
    /// Delay before a rejection notice is shown
    pub notice_delay: Duration,
    /// User agent string
    pub user_agent: String,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Failure messages
    pub messages: StatusMessages,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(120),
            with_credentials: true,
            csrf_cookie_name: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            requested_with: "XMLHttpRequest".to_string(),
            notice_delay: DEFAULT_NOTICE_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            accept_invalid_certs: false,
            messages: StatusMessages::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new client config
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup. Unset keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup(env_keys::BASE_URL) {
            config.base_url = Some(Url::parse(&base)?);
        }
        if let Some(secs) = lookup(env_keys::TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("Invalid timeout: {}", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = lookup(env_keys::WITH_CREDENTIALS) {
            config.with_credentials = parse_flag(&flag)?;
        }
        if let Some(name) = lookup(env_keys::CSRF_COOKIE) {
            config.csrf_cookie_name = name;
        }
        if let Some(locale) = lookup(env_keys::LOCALE) {
            config.messages = StatusMessages::for_locale(locale.parse::<Locale>()?);
        }
        config.proxy = lookup(env_keys::PROXY);

        Ok(config)
    }

    /// Set base URL
    pub fn base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(base_url.as_ref())?);
        Ok(self)
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send credentials cross-origin
    pub fn with_credentials(mut self, include: bool) -> Self {
        self.with_credentials = include;
        self
    }

    /// Set anti-forgery cookie name
    pub fn csrf_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.csrf_cookie_name = name.into();
        self
    }

    /// Set notice delay
    pub fn notice_delay(mut self, delay: Duration) -> Self {
        self.notice_delay = delay;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set message locale
    pub fn locale(mut self, locale: Locale) -> Self {
        self.messages = StatusMessages::for_locale(locale);
        self
    }

    /// Resolve a request path against the base URL
    pub fn resolve(&self, path: &str) -> Result<Url> {
        match &self.base_url {
            Some(base) => Ok(base.join(path)?),
            None => Ok(Url::parse(path)?),
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::config(format!("Invalid boolean: {}", other))),
    }
}
