//! Rate limiting for high-frequency host notifications.
//!
//! Both types are driven by caller-supplied timestamps in milliseconds
//! (e.g. `performance.now()` or an animation-frame timestamp), so they hold
//! no timers of their own and are trivially testable.

/// Latest-wins debouncer.
///
/// Every [`push`](Debouncer::push) replaces the pending value and restarts
/// the quiet interval. [`poll`](Debouncer::poll) hands the value out once the
/// interval has elapsed without a newer push.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    interval_ms: f64,
    pending: Option<(T, f64)>,
}

impl<T> Debouncer<T> {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now_ms: f64) {
        self.pending = Some((value, now_ms));
    }

    /// Takes the pending value if it has been quiet for the full interval.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match self.pending {
            Some((_, at)) if now_ms - at >= self.interval_ms => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }
}

/// Leading-edge throttle: lets a call through at most once per `wait_ms`.
#[derive(Debug, Clone)]
pub struct Throttle {
    wait_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    pub fn new(wait_ms: f64) -> Self {
        Self {
            wait_ms: wait_ms.max(0.0),
            last_ms: None,
        }
    }

    /// Returns `true` and records `now_ms` when enough time has passed.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.wait_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}
