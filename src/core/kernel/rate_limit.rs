//! Request budgets for the two authentication modes.
//!
//! Each mode owns an independent sliding-window log: at most `max_requests`
//! permits are issued in any span of `window`. Waiters of one mode are served
//! strictly in arrival order; the two modes never share a lock.

use crate::core::config::ConfigError;
use crate::core::errors::ExchangeError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateMode {
    Authenticated,
    Unauthenticated,
}

impl RateMode {
    pub const fn for_request(authenticated: bool) -> Self {
        if authenticated {
            Self::Authenticated
        } else {
            Self::Unauthenticated
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBudget {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateBudget {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub const fn per_second(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }
}

/// Budgets for both modes. The venue allows 1000 requests per second in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub authenticated: RateBudget,
    pub unauthenticated: RateBudget,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            authenticated: RateBudget::per_second(1000),
            unauthenticated: RateBudget::per_second(1000),
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, budget) in [
            ("authenticated", self.authenticated),
            ("unauthenticated", self.unauthenticated),
        ] {
            if budget.max_requests == 0 || budget.window.is_zero() {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "{} rate budget must allow at least one request per non-empty window",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Proof that one request may be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permit {
    pub mode: RateMode,
    pub waited: Duration,
}

#[derive(Debug)]
struct Bucket {
    budget: RateBudget,
    issued: Mutex<VecDeque<Instant>>,
    // tokio's mutex hands the lock out in FIFO order
    queue: tokio::sync::Mutex<()>,
}

impl Bucket {
    fn new(budget: RateBudget) -> Self {
        Self {
            budget,
            issued: Mutex::new(VecDeque::with_capacity(budget.max_requests.min(1024) as usize)),
            queue: tokio::sync::Mutex::new(()),
        }
    }

    fn prune(&self, issued: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = issued.front() {
            if now.duration_since(oldest) >= self.budget.window {
                issued.pop_front();
            } else {
                break;
            }
        }
    }

    /// Record a permit at `now`, or report how long until one frees up.
    fn reserve(&self, now: Instant) -> Result<(), Duration> {
        let mut issued = self.issued.lock();
        self.prune(&mut issued, now);

        if issued.len() < self.budget.max_requests as usize {
            issued.push_back(now);
            return Ok(());
        }

        Err(issued.front().map_or(self.budget.window, |&oldest| {
            self.budget.window.saturating_sub(now.duration_since(oldest))
        }))
    }

    async fn acquire(&self, mode: RateMode) -> Permit {
        let start = Instant::now();
        let _turn = self.queue.lock().await;

        loop {
            match self.reserve(Instant::now()) {
                Ok(()) => {
                    return Permit {
                        mode,
                        waited: start.elapsed(),
                    }
                }
                Err(wait) => {
                    debug!(?mode, wait_ms = wait.as_millis() as u64, "rate budget exhausted, waiting");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    fn try_acquire(&self, mode: RateMode) -> Option<Permit> {
        // Queued waiters keep their place.
        let _turn = self.queue.try_lock().ok()?;
        self.reserve(Instant::now()).ok().map(|()| Permit {
            mode,
            waited: Duration::ZERO,
        })
    }

    fn in_window(&self) -> usize {
        let mut issued = self.issued.lock();
        self.prune(&mut issued, Instant::now());
        issued.len()
    }
}

/// Dual-mode rate limiter owned by one gateway client.
#[derive(Debug)]
pub struct RateLimiter {
    authenticated: Bucket,
    unauthenticated: Bucket,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            authenticated: Bucket::new(config.authenticated),
            unauthenticated: Bucket::new(config.unauthenticated),
        }
    }

    fn bucket(&self, mode: RateMode) -> &Bucket {
        match mode {
            RateMode::Authenticated => &self.authenticated,
            RateMode::Unauthenticated => &self.unauthenticated,
        }
    }

    /// Wait until the budget of `mode` allows one more request.
    ///
    /// Dropping the returned future before it completes consumes nothing.
    pub async fn acquire(&self, mode: RateMode) -> Permit {
        self.bucket(mode).acquire(mode).await
    }

    /// Like [`acquire`](Self::acquire), but give up after `max_wait`.
    pub async fn acquire_within(
        &self,
        mode: RateMode,
        max_wait: Duration,
    ) -> Result<Permit, ExchangeError> {
        tokio::time::timeout(max_wait, self.acquire(mode))
            .await
            .map_err(|_| ExchangeError::RateLimitTimeout(max_wait))
    }

    /// Take a permit only if one is available right now and nobody is queued.
    pub fn try_acquire(&self, mode: RateMode) -> Option<Permit> {
        self.bucket(mode).try_acquire(mode)
    }

    /// Permits issued for `mode` within the current window.
    pub fn in_flight_window(&self, mode: RateMode) -> usize {
        self.bucket(mode).in_window()
    }

    pub fn budget(&self, mode: RateMode) -> RateBudget {
        self.bucket(mode).budget
    }
}
