//! Owned timer registry on a virtual clock.
//!
//! Every delayed action is registered with the round index it belongs to and
//! can be cancelled individually, by predicate, by round, or wholesale. The
//! clock only moves when the owner calls [`TimerRegistry::pop_due`] /
//! [`TimerRegistry::advance_to`], so tests can drive time deterministically.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Expired<A> {
    pub id: TimerId,
    pub round_index: usize,
    pub due_at: Duration,
    pub action: A,
}

#[derive(Debug, Clone)]
struct Pending<A> {
    id: TimerId,
    round_index: usize,
    due_at: Duration,
    action: A,
}

#[derive(Debug, Clone)]
pub struct TimerRegistry<A> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for TimerRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerRegistry<A> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Runs `action` once `delay` has elapsed on the registry clock.
    pub fn schedule(&mut self, delay: Duration, round_index: usize, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            round_index,
            due_at: self.now + delay,
            action,
        });
        id
    }

    /// Returns whether the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        before != self.pending.len()
    }

    /// Cancels every pending timer whose action matches; returns how many.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&A) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|timer| !predicate(&timer.action));
        before - self.pending.len()
    }

    /// Cancels every timer tagged with a round other than `current_round`.
    pub fn cancel_stale(&mut self, current_round: usize) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|timer| timer.round_index == current_round);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn is_pending(&self, mut predicate: impl FnMut(&A) -> bool) -> bool {
        self.pending.iter().any(|timer| predicate(&timer.action))
    }

    pub fn rounds_pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.iter().map(|timer| timer.round_index)
    }

    /// Removes and returns the earliest timer due at or before `horizon`,
    /// moving the clock to its due time. Ties fire in scheduling order.
    pub fn pop_due(&mut self, horizon: Duration) -> Option<Expired<A>> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_at <= horizon)
            .min_by_key(|(_, timer)| (timer.due_at, timer.id))
            .map(|(position, _)| position)?;

        let timer = self.pending.remove(position);
        self.now = self.now.max(timer.due_at);
        Some(Expired {
            id: timer.id,
            round_index: timer.round_index,
            due_at: timer.due_at,
            action: timer.action,
        })
    }

    /// Moves the clock forward to `horizon` (never backwards).
    pub fn advance_to(&mut self, horizon: Duration) {
        self.now = self.now.max(horizon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn drain(registry: &mut TimerRegistry<&'static str>, horizon: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(expired) = registry.pop_due(horizon) {
            fired.push(expired.action);
        }
        registry.advance_to(horizon);
        fired
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut registry = TimerRegistry::new();
        registry.schedule(ms(300), 0, "late");
        registry.schedule(ms(100), 0, "early");
        registry.schedule(ms(100), 0, "early-second");
        registry.schedule(ms(900), 0, "future");

        assert_eq!(drain(&mut registry, ms(500)), vec!["early", "early-second", "late"]);
        assert_eq!(registry.now(), ms(500));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn delays_are_relative_to_the_clock() {
        let mut registry = TimerRegistry::new();
        registry.advance_to(ms(1_000));
        registry.schedule(ms(200), 0, "tick");
        assert!(drain(&mut registry, ms(1_100)).is_empty());
        assert_eq!(drain(&mut registry, ms(1_200)), vec!["tick"]);
    }

    #[test]
    fn pop_due_moves_clock_to_deadline() {
        let mut registry = TimerRegistry::new();
        registry.schedule(ms(250), 0, "a");
        let expired = registry.pop_due(ms(1_000)).expect("timer due");
        assert_eq!(expired.due_at, ms(250));
        assert_eq!(registry.now(), ms(250));
    }

    #[test]
    fn cancel_individual_timer() {
        let mut registry = TimerRegistry::new();
        let keep = registry.schedule(ms(10), 0, "keep");
        let dropped = registry.schedule(ms(10), 0, "drop");
        assert!(registry.cancel(dropped));
        assert!(!registry.cancel(dropped));
        assert!(registry.is_pending(|action| *action == "keep"));
        assert!(registry.cancel(keep));
        assert!(registry.is_empty());
    }

    #[test]
    fn cancel_stale_sweeps_old_rounds() {
        let mut registry = TimerRegistry::new();
        registry.schedule(ms(10), 0, "old");
        registry.schedule(ms(10), 1, "current");
        registry.schedule(ms(20), 0, "old-again");

        assert_eq!(registry.cancel_stale(1), 2);
        assert!(registry.rounds_pending().all(|round| round == 1));
        assert_eq!(drain(&mut registry, ms(100)), vec!["current"]);
    }

    #[test]
    fn cancel_where_matches_actions() {
        let mut registry = TimerRegistry::new();
        registry.schedule(ms(10), 0, "hint");
        registry.schedule(ms(20), 0, "hint");
        registry.schedule(ms(30), 0, "pointer");
        assert_eq!(registry.cancel_where(|action| *action == "hint"), 2);
        assert_eq!(registry.cancel_all(), 1);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut registry: TimerRegistry<&'static str> = TimerRegistry::new();
        registry.advance_to(ms(500));
        registry.advance_to(ms(100));
        assert_eq!(registry.now(), ms(500));
    }
}
