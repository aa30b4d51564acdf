use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Number of checks between two sweeps of idle clients.
const SWEEP_EVERY: usize = 1024;

/// Sliding-window request counter per client address.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<DashMap<IpAddr, VecDeque<Instant>>>,
    checks: Arc<AtomicUsize>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
            checks: Arc::new(AtomicUsize::new(0)),
            max_requests,
            window,
        }
    }

    /// Records a request from `client` if it fits in the window. Rejected
    /// requests are not recorded.
    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        let allowed = self.record(client, now);

        // The entry guard is released by now; `retain` locks every shard.
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep_at(now);
        }

        allowed
    }

    fn record(&self, client: IpAddr, now: Instant) -> bool {
        let mut entry = self.requests.entry(client).or_default();
        let timestamps = entry.value_mut();

        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) < self.window {
                break;
            }
            timestamps.pop_front();
        }

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Forgets clients with no request left inside the window.
    fn sweep_at(&self, now: Instant) {
        self.requests.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|latest| now.duration_since(*latest) < self.window)
        });
    }
}
