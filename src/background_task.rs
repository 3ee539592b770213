use tokio::time::{interval, Duration};

use crate::limiter::rate_limiter::SlidingWindowLimiter;

/// Periodically forgets clients whose attempts have all left the window.
pub async fn start_rate_limit_sweep(limiter: SlidingWindowLimiter, period: Duration) {
    let mut interval = interval(period);

    loop {
        interval.tick().await;

        let removed = limiter.sweep();
        if removed > 0 {
            tracing::debug!("Rate limiter sweep removed {} idle clients", removed);
        }
    }
}
