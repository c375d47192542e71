//! Keystroke debouncing.
//!
//! The timer holds at most one pending payload together with its deadline.
//! The event loop polls it on every tick; nothing runs in the background.

use std::time::{Duration, Instant};

/// Releases the last triggered payload once `delay` has passed without
/// another trigger.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period. An already pending payload keeps its deadline.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedule `payload`, replacing whatever was pending and restarting the
    /// quiet period from `now`.
    pub fn trigger(&mut self, payload: T, now: Instant) {
        self.pending = Some((now + self.delay, payload));
    }

    /// Drop the pending payload. Returns whether anything was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Peek at the payload that would be released next.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, payload)| payload)
    }

    /// Release the pending payload if its deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if now >= deadline => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn releases_only_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger("Ric", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(499)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some("Ric"));
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn retrigger_restarts_the_period_and_replaces_payload() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger("Pa", start);
        debouncer.trigger("Par", start + Duration::from_millis(300));

        // The first deadline has passed but was superseded.
        assert_eq!(debouncer.poll(start + Duration::from_millis(600)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(800)),
            Some("Par")
        );
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn cancel_discards_without_release() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger(1, start);

        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.poll(start + DELAY * 2), None);
    }

    #[test]
    fn payload_can_be_a_callback() {
        let start = Instant::now();
        let mut debouncer: Debouncer<Box<dyn FnOnce() -> u32>> = Debouncer::new(DELAY);
        debouncer.trigger(Box::new(|| 7), start);

        let callback = debouncer.poll(start + DELAY).expect("callback released");
        assert_eq!(callback(), 7);
    }
}
