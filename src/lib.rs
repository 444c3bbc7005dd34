// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # xhrgate - Deduplicating HTTP client
//!
//! An HTTP client for JSON APIs that wrap their payloads in a
//! `{code, result, data}` envelope.
//!
//! ## Features
//!
//! - Duplicate suppression: a request identical to one still in flight
//!   cancels the older one
//! - Anti-forgery header read from the cookie jar, `X-Requested-With` marker
//! - Envelope classification into a payload or a typed [`Error`]
//! - Delayed, suppressible user notices for rejections
//! - Explicit re-authentication outcome instead of a request that never settles
//!
//! ## Example
//!
//! ```rust,no_run
//! use xhrgate::{ClientConfig, HttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new().base_url("https://app.example.com/api/")?;
//!     let client = HttpClient::with_config(config)?;
//!
//!     match client.get("projects").await {
//!         Ok(projects) => println!("{}", projects),
//!         Err(err) if err.is_cancelled() => {}
//!         Err(err) => {
//!             // Handled here, so the default notice is not needed
//!             err.hide_normal_error();
//!             eprintln!("{}", err);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod http;
pub mod intercept;
pub mod notify;

// Re-exports for convenience

// Configuration
pub use config::{ClientConfig, DEFAULT_USER_AGENT};

// Deduplication
pub use dedup::{Fingerprint, PendingRegistry};

// Errors
pub use error::{Error, NormalizedError, Result, CANCELLED_SENTINEL};

// HTTP
pub use http::{ClientBuilder, Cookie, CookieJar, HttpClient, Request, RequestBody, Response};

// Interception
pub use intercept::{HookAction, HookChain, Locale, RequestHook, StatusMessages};

// Notification
pub use notify::{DelayedNotice, Notifier, Reauthenticator};

/// xhrgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
