use precis_core::coordinator::RequestCoordinator;
use precis_core::worker::limits::TimeLimits;

use crate::rate_limit::limiter::RateLimiter;

#[derive(Clone)]
pub struct ServerState {
    coordinator: RequestCoordinator,
    rate_limiter: RateLimiter,
    time_limits: TimeLimits,
    max_text_length: usize,
}

impl From<(RequestCoordinator, RateLimiter, TimeLimits, usize)> for ServerState {
    fn from(states: (RequestCoordinator, RateLimiter, TimeLimits, usize)) -> Self {
        let (coordinator, rate_limiter, time_limits, max_text_length) = states;
        Self {
            coordinator,
            rate_limiter,
            time_limits,
            max_text_length,
        }
    }
}

impl ServerState {
    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn time_limits(&self) -> TimeLimits {
        self.time_limits
    }

    pub fn max_text_length(&self) -> usize {
        self.max_text_length
    }
}
