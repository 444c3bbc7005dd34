// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Delayed, suppressible user notice

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::Notifier;

/// Default delay before a rejection notice is shown
pub const DEFAULT_NOTICE_DELAY: Duration = Duration::from_millis(100);

/// A notice that fires after a delay unless it was suppressed.
///
/// The caller's own error handling has the whole delay window to call
/// [`suppress`], which also aborts the pending timer and releases the
/// notifier it holds.
///
/// [`suppress`]: DelayedNotice::suppress
#[derive(Debug, Clone)]
pub struct DelayedNotice {
    visible: Arc<AtomicBool>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl DelayedNotice {
    /// Schedule `message` to be shown through `notifier` after `delay`.
    ///
    /// Outside a tokio runtime there is no timer to wait on and the notice
    /// is shown immediately.
    pub fn schedule(notifier: Arc<dyn Notifier>, message: impl Into<String>, delay: Duration) -> Self {
        let visible = Arc::new(AtomicBool::new(true));
        let message = message.into();

        let timer = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let flag = visible.clone();
                Some(runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if flag.load(Ordering::Acquire) {
                        notifier.show(&message);
                    }
                }))
            }
            Err(_) => {
                tracing::warn!("No runtime available, showing notice without delay");
                notifier.show(&message);
                None
            }
        };

        Self {
            visible,
            timer: Arc::new(Mutex::new(timer)),
        }
    }

    /// A notice that never shows anything
    pub fn disabled() -> Self {
        Self {
            visible: Arc::new(AtomicBool::new(false)),
            timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Prevent the notice from being shown
    pub fn suppress(&self) {
        self.visible.store(false, Ordering::Release);
        if let Some(timer) = self.timer.lock().take() {
            timer.abort();
        }
    }

    /// Check whether the notice will be shown
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Check whether the timer is still running
    pub fn is_pending(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .map_or(false, |timer| !timer.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        shown: Mutex<Vec<String>>,
    }

    impl Notifier for Recorder {
        fn show(&self, message: &str) {
            self.shown.lock().push(message.to_string());
        }
    }

    async fn settle(delay: Duration) {
        tokio::time::sleep(delay).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_fires_after_delay() {
        let recorder = Arc::new(Recorder::default());
        let _notice = DelayedNotice::schedule(recorder.clone(), "boom", DEFAULT_NOTICE_DELAY);

        settle(Duration::from_millis(50)).await;
        assert!(recorder.shown.lock().is_empty());

        settle(Duration::from_millis(60)).await;
        assert_eq!(*recorder.shown.lock(), vec!["boom".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suppressed_within_window() {
        let recorder = Arc::new(Recorder::default());
        let notice = DelayedNotice::schedule(recorder.clone(), "boom", DEFAULT_NOTICE_DELAY);

        settle(Duration::from_millis(40)).await;
        notice.suppress();

        settle(Duration::from_millis(200)).await;
        assert!(recorder.shown.lock().is_empty());
        assert!(!notice.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_suppress_releases_timer() {
        let recorder = Arc::new(Recorder::default());
        let notice = DelayedNotice::schedule(recorder.clone(), "boom", DEFAULT_NOTICE_DELAY);
        assert!(notice.is_pending());
        assert_eq!(Arc::strong_count(&recorder), 2);

        notice.clone().suppress();
        settle(Duration::from_millis(1)).await;

        assert!(!notice.is_pending());
        assert_eq!(Arc::strong_count(&recorder), 1);
        assert!(recorder.shown.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_finishes_after_firing() {
        let recorder = Arc::new(Recorder::default());
        let notice = DelayedNotice::schedule(recorder.clone(), "boom", DEFAULT_NOTICE_DELAY);

        settle(Duration::from_millis(150)).await;
        assert!(!notice.is_pending());
        assert_eq!(Arc::strong_count(&recorder), 1);
        assert_eq!(recorder.shown.lock().len(), 1);
    }

    #[test]
    fn test_without_runtime_shows_immediately() {
        let recorder = Arc::new(Recorder::default());
        let _notice = DelayedNotice::schedule(recorder.clone(), "now", DEFAULT_NOTICE_DELAY);
        assert_eq!(recorder.shown.lock().len(), 1);
    }
}
