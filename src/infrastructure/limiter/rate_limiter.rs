use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Outcome of one admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: usize,
    /// Time until the oldest attempt in the window expires.
    pub reset_after: Duration,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds for a `Retry-After` header, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        let rounded = if self.reset_after.subsec_nanos() > 0 { secs + 1 } else { secs };
        rounded.max(1)
    }
}

/// Read-only view of one key's attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub attempts: usize,
    pub remaining: usize,
    pub reset_after: Duration,
}

/// Sliding-log limiter: at most `max_attempts` per key over a trailing
/// `window`. Each key keeps the instants of its attempts inside the window.
/// Process-local; a multi-instance deployment needs a shared store.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    attempts: Arc<DashMap<String, VecDeque<Instant>>>,
    max_attempts: usize,
    window: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            window,
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Prunes expired attempts, then records `now` if capacity remains.
    /// The entry guard serializes concurrent checks for the same key.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut entry = self.attempts.entry(key.to_string()).or_default();
        let log = entry.value_mut();
        self.prune(log, now);

        let allowed = log.len() < self.max_attempts;
        if allowed {
            log.push_back(now);
        }

        let reset_after = self.reset_after(log, now);
        RateLimitDecision {
            allowed,
            remaining: self.max_attempts.saturating_sub(log.len()),
            reset_after,
            reset_at: wall_clock_after(reset_after),
        }
    }

    /// Same view as `check_at` without recording an attempt.
    pub fn status_at(&self, key: &str, now: Instant) -> RateLimitStatus {
        let (attempts, reset_after) = match self.attempts.get(key) {
            Some(log) => {
                let mut live = log.iter().copied().filter(|t| self.is_live(*t, now));
                let oldest = live.next();
                let attempts = oldest.map_or(0, |_| 1 + live.count());
                let reset_after = oldest
                    .map(|t| self.window.saturating_sub(now.saturating_duration_since(t)))
                    .unwrap_or(Duration::ZERO);
                (attempts, reset_after)
            }
            None => (0, Duration::ZERO),
        };

        RateLimitStatus {
            attempts,
            remaining: self.max_attempts.saturating_sub(attempts),
            reset_after,
        }
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Drops keys with no attempt left inside the window. Returns how many went.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.attempts.len();
        self.attempts.retain(|_, log| {
            self.prune(log, now);
            !log.is_empty()
        });
        before.saturating_sub(self.attempts.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.attempts.len()
    }

    fn is_live(&self, attempt: Instant, now: Instant) -> bool {
        now.saturating_duration_since(attempt) < self.window
    }

    fn prune(&self, log: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = log.front() {
            if self.is_live(*oldest, now) {
                break;
            }
            log.pop_front();
        }
    }

    fn reset_after(&self, log: &VecDeque<Instant>, now: Instant) -> Duration {
        log.front()
            .map(|oldest| self.window.saturating_sub(now.saturating_duration_since(*oldest)))
            .unwrap_or(self.window)
    }
}

fn wall_clock_after(delay: Duration) -> DateTime<Utc> {
    let delay = chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero());
    Utc::now() + delay
}
