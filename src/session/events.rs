//! Asynchronous notifications from the camera worker to the owning thread.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::errors::CameraError;
use crate::types::Size;

/// What the worker reports back to the session owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    /// Configuration finished; carries the negotiated preview size.
    PreviewSizeReady(Size),
    /// An open/configure/start job failed. The worker keeps running.
    Error(CameraError),
    /// Teardown finished; the session is terminally closed.
    Closed,
}

/// Bounded drop-oldest event queue between the worker and the owner.
///
/// The worker posts without ever blocking; when the owner falls behind, the
/// oldest event is dropped and counted. Closing the channel wakes pollers.
pub struct NotificationChannel {
    inner: Mutex<ChannelInner>,
    cv: Condvar,
}

struct ChannelInner {
    events: VecDeque<CameraEvent>,
    capacity: usize,
    dropped: u64,
    closed: bool,
}

impl NotificationChannel {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ChannelInner {
                events: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                dropped: 0,
                closed: false,
            }),
            cv: Condvar::new(),
        }
    }

    pub(crate) fn post(&self, event: CameraEvent) {
        let mut g = self.inner.lock().expect("lock poisoned");
        if g.closed {
            return;
        }
        if g.events.len() >= g.capacity {
            g.events.pop_front();
            g.dropped = g.dropped.saturating_add(1);
        }
        g.events.push_back(event);
        self.cv.notify_one();
    }

    /// Wait up to `timeout` for the next event. Returns `None` on timeout
    /// or once the channel is closed and drained.
    pub fn poll(&self, timeout: Duration) -> Option<CameraEvent> {
        let mut g = self.inner.lock().expect("lock poisoned");

        if timeout == Duration::ZERO {
            return g.events.pop_front();
        }

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = g.events.pop_front() {
                return Some(event);
            }
            if g.closed {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (ng, _) = self
                .cv
                .wait_timeout(g, deadline - now)
                .expect("lock poisoned");
            g = ng;
        }
    }

    /// Events discarded because the owner fell behind.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().expect("lock poisoned").dropped
    }

    pub(crate) fn close(&self) {
        let mut g = self.inner.lock().expect("lock poisoned");
        g.closed = true;
        self.cv.notify_all();
    }
}
