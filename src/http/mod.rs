// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer
//!
//! Wraps reqwest with duplicate suppression, cookie handling, hook
//! chains and envelope classification.

mod client;
mod cookie;
mod request;
mod response;

pub use client::{ClientBuilder, HttpClient, RequestBuilder};
pub use cookie::{Cookie, CookieJar};
pub use request::{CredentialsMode, Request, RequestBody};
pub use response::Response;

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const X_REQUESTED_WITH: &str = "x-requested-with";
}
