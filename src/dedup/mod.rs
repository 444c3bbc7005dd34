// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-flight request deduplication
//!
//! Every outgoing request is fingerprinted. When a request arrives whose
//! fingerprint is already in flight, the older request is cancelled before
//! the new one is registered.

mod fingerprint;
mod registry;

pub use fingerprint::{canonical_query, Fingerprint};
pub use registry::{cancel_pair, CancelHandle, CancelSignal, PendingRegistry, SlotId};

pub(crate) use registry::PendingGuard;
