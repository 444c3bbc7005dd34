// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! User-facing side effects of failed requests
//!
//! Rejections schedule a delayed notice through a [`Notifier`]; a 401
//! triggers the [`Reauthenticator`]. Both are traits so the embedding
//! application decides what "show a toast" and "go to login" mean.

mod notice;

pub use notice::{DelayedNotice, DEFAULT_NOTICE_DELAY};

/// Notification sink (toast, alert, status bar...)
pub trait Notifier: Send + Sync {
    /// Show a message to the user
    fn show(&self, message: &str);
}

/// Notifier that writes notices to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, message: &str) {
        tracing::warn!(message = %message, "Request failed");
    }
}

/// Re-authentication trigger (e.g. redirect to a login page)
pub trait Reauthenticator: Send + Sync {
    /// Start re-authentication. `login_url` is taken from the server
    /// response when it provides one.
    fn reauthenticate(&self, login_url: Option<&str>);
}

/// Reauthenticator that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReauthenticator;

impl Reauthenticator for LogReauthenticator {
    fn reauthenticate(&self, login_url: Option<&str>) {
        tracing::info!(login_url = ?login_url, "Re-authentication required");
    }
}
