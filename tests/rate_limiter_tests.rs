use std::time::{Duration, Instant};

use spa_contact::limiter::rate_limiter::SlidingWindowLimiter;

const WINDOW: Duration = Duration::from_secs(900);

#[test]
fn denies_the_attempt_after_the_quota() {
    let limiter = SlidingWindowLimiter::new(3, WINDOW);
    let start = Instant::now();

    for i in 0..3 {
        let decision = limiter.check_at("203.0.113.1", start + Duration::from_secs(i));
        assert!(decision.allowed, "attempt {} should pass", i + 1);
        assert_eq!(decision.remaining, 2 - i as usize);
    }

    let denied = limiter.check_at("203.0.113.1", start + Duration::from_secs(10));
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 0);
    // Oldest attempt (at `start`) expires first
    assert_eq!(denied.reset_after, WINDOW - Duration::from_secs(10));
    assert_eq!(denied.retry_after_secs(), 890);
}

#[test]
fn allows_again_once_the_earliest_attempt_leaves_the_window() {
    let limiter = SlidingWindowLimiter::new(3, WINDOW);
    let start = Instant::now();

    limiter.check_at("ip", start);
    limiter.check_at("ip", start + Duration::from_secs(60));
    limiter.check_at("ip", start + Duration::from_secs(120));
    assert!(!limiter.check_at("ip", start + WINDOW - Duration::from_secs(1)).allowed);

    let after_first_expired = limiter.check_at("ip", start + WINDOW);
    assert!(after_first_expired.allowed);
    assert_eq!(after_first_expired.remaining, 0);

    // The second attempt is still inside the window
    assert!(!limiter.check_at("ip", start + WINDOW + Duration::from_secs(30)).allowed);
    assert!(limiter.check_at("ip", start + WINDOW + Duration::from_secs(60)).allowed);
}

#[test]
fn denied_checks_are_not_recorded() {
    let limiter = SlidingWindowLimiter::new(1, WINDOW);
    let start = Instant::now();

    assert!(limiter.check_at("ip", start).allowed);
    for i in 1..10 {
        assert!(!limiter.check_at("ip", start + Duration::from_secs(i)).allowed);
    }

    assert!(limiter.check_at("ip", start + WINDOW).allowed);
}

#[test]
fn keys_are_independent() {
    let limiter = SlidingWindowLimiter::new(1, WINDOW);
    let now = Instant::now();

    assert!(limiter.check_at("198.51.100.1", now).allowed);
    assert!(!limiter.check_at("198.51.100.1", now).allowed);
    assert!(limiter.check_at("198.51.100.2", now).allowed);
    assert!(limiter.check_at("unknown", now).allowed);
}

#[test]
fn status_does_not_consume_capacity() {
    let limiter = SlidingWindowLimiter::new(2, WINDOW);
    let start = Instant::now();

    let empty = limiter.status_at("ip", start);
    assert_eq!(empty.attempts, 0);
    assert_eq!(empty.remaining, 2);

    limiter.check_at("ip", start);
    for _ in 0..5 {
        let status = limiter.status_at("ip", start + Duration::from_secs(100));
        assert_eq!(status.attempts, 1);
        assert_eq!(status.remaining, 1);
        assert_eq!(status.reset_after, WINDOW - Duration::from_secs(100));
    }

    assert!(limiter.check_at("ip", start + Duration::from_secs(100)).allowed);
}

#[test]
fn sweep_drops_only_idle_keys() {
    let limiter = SlidingWindowLimiter::new(3, WINDOW);
    let start = Instant::now();

    limiter.check_at("idle", start);
    limiter.check_at("active", start + Duration::from_secs(800));
    assert_eq!(limiter.tracked_keys(), 2);

    let removed = limiter.sweep_at(start + WINDOW + Duration::from_secs(1));

    assert_eq!(removed, 1);
    assert_eq!(limiter.tracked_keys(), 1);
    assert_eq!(limiter.status_at("active", start + WINDOW).attempts, 1);
}

#[test]
fn concurrent_checks_never_exceed_quota() {
    let limiter = SlidingWindowLimiter::new(5, WINDOW);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let limiter = limiter.clone();
            std::thread::spawn(move || {
                (0..10).filter(|_| limiter.check("shared").allowed).count()
            })
        })
        .collect();

    let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(allowed, 5);
}
