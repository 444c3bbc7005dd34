// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request/response interception
//!
//! Header injection hooks on the way out, envelope classification and the
//! localized failure table on the way back.

mod classify;
mod hooks;
mod messages;

pub use classify::{classify_failure, classify_response, is_truthy, Envelope, Rejection, Verdict};
pub use hooks::{
    AuthHeaderInjector, CsrfTokenInjector, HookAction, HookChain, RequestHook, RequestLogger,
    RequestedWithMarker,
};
pub use messages::{Locale, StatusMessages};
