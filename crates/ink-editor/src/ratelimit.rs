//! Rate limiters with explicit, injected time.

use ink_core::Millis;

/// Trailing-edge debounce: keeps the latest value and releases it once no
/// new value arrived for `delay`.
#[derive(Debug)]
pub struct Debounce<T> {
    delay: Millis,
    pending: Option<(Millis, T)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Millis) -> Self {
        Self { delay, pending: None }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn call(&mut self, now: Millis, value: T) {
        self.pending = Some((now + self.delay, value));
    }

    /// Release the value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if now >= deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Release the pending value immediately (teardown).
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will be released.
    pub fn deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }
}

/// Leading-edge throttle: at most one call per `interval`.
#[derive(Debug)]
pub struct Throttle {
    interval: Millis,
    last: Option<Millis>,
}

impl Throttle {
    pub fn new(interval: Millis) -> Self {
        Self { interval, last: None }
    }

    /// Whether a call at `now` may proceed. Records it if so.
    pub fn try_acquire(&mut self, now: Millis) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_waits_for_quiet_period() {
        let mut d = Debounce::new(300);
        d.call(0, 1);
        d.call(200, 2);
        assert_eq!(d.poll(400), None);
        assert_eq!(d.poll(500), Some(2));
        assert_eq!(d.poll(900), None);
    }

    #[test]
    fn debounce_flush_and_cancel() {
        let mut d = Debounce::new(300);
        d.call(0, "a");
        assert_eq!(d.flush(), Some("a"));
        d.call(0, "b");
        d.cancel();
        assert!(!d.is_pending());
        assert_eq!(d.poll(1000), None);
    }

    #[test]
    fn throttle_spaces_calls() {
        let mut t = Throttle::new(300);
        assert!(t.try_acquire(1000));
        assert!(!t.try_acquire(1100));
        assert!(!t.try_acquire(1299));
        assert!(t.try_acquire(1300));
        t.reset();
        assert!(t.try_acquire(1301));
    }
}
