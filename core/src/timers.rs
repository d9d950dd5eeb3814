//! Cancellable one-shot timers driven by simulated time.

use std::time::Duration;

/// Handle identifying a scheduled timer so that it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

/// Set of pending one-shot timers carrying a task payload.
///
/// Timers only advance when [`Timers::advance`] is called, so all waiting is
/// expressed in simulated time and a cancelled timer can never fire.
#[derive(Clone, Debug)]
pub struct Timers<T> {
    next_token: u64,
    pending: Vec<PendingTimer<T>>,
}

#[derive(Clone, Debug)]
struct PendingTimer<T> {
    token: TimerToken,
    remaining: Duration,
    task: T,
}

impl<T> Timers<T> {
    /// Creates an empty timer set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_token: 0,
            pending: Vec::new(),
        }
    }

    /// Schedules `task` to fire once `delay` of simulated time has elapsed.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.pending.push(PendingTimer {
            token,
            remaining: delay,
            task,
        });
        token
    }

    /// Cancels the timer identified by `token`, reporting whether it was pending.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.token != token);
        self.pending.len() != before
    }

    /// Cancels every pending timer, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Time left before the identified timer fires.
    #[must_use]
    pub fn remaining(&self, token: TimerToken) -> Option<Duration> {
        self.pending
            .iter()
            .find(|timer| timer.token == token)
            .map(|timer| timer.remaining)
    }

    /// Reports whether the identified timer is still pending.
    #[must_use]
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.remaining(token).is_some()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advances every timer by `dt`, appending expired tasks to `fired` in
    /// expiry order. Ties fire in scheduling order.
    pub fn advance(&mut self, dt: Duration, fired: &mut Vec<T>) {
        let mut expired = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].remaining <= dt {
                expired.push(self.pending.remove(index));
            } else {
                self.pending[index].remaining -= dt;
                index += 1;
            }
        }
        expired.sort_by_key(|timer| (timer.remaining, timer.token));
        fired.extend(expired.into_iter().map(|timer| timer.task));
    }
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_delay_elapses() {
        let mut timers = Timers::new();
        let _ = timers.schedule(Duration::from_millis(300), "kickoff");
        let mut fired = Vec::new();

        timers.advance(Duration::from_millis(200), &mut fired);
        assert!(fired.is_empty());

        timers.advance(Duration::from_millis(100), &mut fired);
        assert_eq!(fired, vec!["kickoff"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = Timers::new();
        let token = timers.schedule(Duration::from_millis(50), 1);
        assert!(timers.cancel(token));
        assert!(!timers.cancel(token));

        let mut fired = Vec::new();
        timers.advance(Duration::from_secs(1), &mut fired);
        assert!(fired.is_empty());
    }

    #[test]
    fn expired_timers_fire_in_expiry_order() {
        let mut timers = Timers::new();
        let _ = timers.schedule(Duration::from_millis(90), 'c');
        let _ = timers.schedule(Duration::from_millis(10), 'a');
        let _ = timers.schedule(Duration::from_millis(10), 'b');
        let late = timers.schedule(Duration::from_millis(500), 'z');

        let mut fired = Vec::new();
        timers.advance(Duration::from_millis(100), &mut fired);
        assert_eq!(fired, vec!['a', 'b', 'c']);
        assert_eq!(timers.remaining(late), Some(Duration::from_millis(400)));
        assert!(timers.is_pending(late));
    }

    #[test]
    fn cancel_all_reports_dropped_count() {
        let mut timers = Timers::new();
        let _ = timers.schedule(Duration::from_millis(1), ());
        let _ = timers.schedule(Duration::from_millis(2), ());
        assert_eq!(timers.cancel_all(), 2);
        assert_eq!(timers.len(), 0);
    }
}
