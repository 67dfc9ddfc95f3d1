//! Request pacing to keep the outbound request rate below block thresholds.
//!
//! The pacer approximates the behavior of a single polite client: every
//! request pays a base delay plus random jitter, with a surcharge once the
//! sustained request count grows. This is a monotonically non-decreasing
//! backoff, not a token bucket; there is no burst allowance beyond the
//! jitter.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Tunable pacing parameters.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Minimum delay between requests before jitter.
    pub base_delay: Duration,
    /// Lower bound of the random jitter added to every delay.
    pub jitter_min: Duration,
    /// Upper bound of the random jitter.
    pub jitter_max: Duration,
    /// Request count above which the soft surcharge applies.
    pub soft_threshold: u32,
    /// Surcharge added once the soft threshold is exceeded.
    pub soft_surcharge: Duration,
    /// Request count above which the hard surcharge applies instead.
    pub hard_threshold: u32,
    /// Surcharge added once the hard threshold is exceeded.
    pub hard_surcharge: Duration,
    /// Window after which the request counter resets.
    pub reset_window: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2000),
            jitter_min: Duration::from_millis(500),
            jitter_max: Duration::from_millis(2500),
            soft_threshold: 10,
            soft_surcharge: Duration::from_millis(1000),
            hard_threshold: 20,
            hard_surcharge: Duration::from_millis(2000),
            reset_window: Duration::from_secs(3600),
        }
    }
}

impl PacingConfig {
    /// A configuration with all delays zeroed, for tests and local mocks.
    pub fn unthrottled() -> Self {
        Self {
            base_delay: Duration::ZERO,
            jitter_min: Duration::ZERO,
            jitter_max: Duration::ZERO,
            soft_surcharge: Duration::ZERO,
            hard_surcharge: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Point-in-time view of the pacing state, exposed by the stats facade.
#[derive(Debug, Clone, Serialize)]
pub struct PacingSnapshot {
    /// Requests made since the last counter reset.
    pub request_count: u32,
    /// Wall-clock time of the last request, if any.
    pub last_request: Option<DateTime<Utc>>,
    /// Wall-clock time of the last counter reset.
    pub counter_reset: DateTime<Utc>,
}

/// Mutable pacing state. `Instant`s drive the delay math; the wall-clock
/// mirrors exist only for the stats snapshot.
struct PacingState {
    last_request: Option<Instant>,
    last_request_at: Option<DateTime<Utc>>,
    request_count: u32,
    counter_reset: Instant,
    counter_reset_at: DateTime<Utc>,
}

impl PacingState {
    fn fresh() -> Self {
        Self {
            last_request: None,
            last_request_at: None,
            request_count: 0,
            counter_reset: Instant::now(),
            counter_reset_at: Utc::now(),
        }
    }
}

/// Serializes request timing across all concurrent searches.
///
/// The state mutex is held across the pacing sleep on purpose: concurrent
/// callers queue behind one another, which is exactly the "one client"
/// cadence the target expects.
pub struct Pacer {
    config: PacingConfig,
    state: Mutex<PacingState>,
}

impl Pacer {
    /// Creates a pacer with the given configuration.
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PacingState::fresh()),
        }
    }

    /// Computes the full inter-request delay for the given request count.
    pub fn compute_delay(config: &PacingConfig, request_count: u32) -> Duration {
        let jitter = if config.jitter_max > config.jitter_min {
            let range = config.jitter_min.as_secs_f64()..config.jitter_max.as_secs_f64();
            Duration::from_secs_f64(rand::thread_rng().gen_range(range))
        } else {
            config.jitter_min
        };

        let surcharge = if request_count > config.hard_threshold {
            config.hard_surcharge
        } else if request_count > config.soft_threshold {
            config.soft_surcharge
        } else {
            Duration::ZERO
        };

        config.base_delay + jitter + surcharge
    }

    /// Waits until the next request is allowed, then records it.
    ///
    /// Dropping the returned future mid-sleep leaves the state untouched;
    /// the counter and last-request stamp are only updated once the sleep
    /// has completed.
    pub async fn wait(&self) {
        let mut state = self.state.lock().await;

        if state.counter_reset.elapsed() > self.config.reset_window {
            state.request_count = 0;
            state.counter_reset = Instant::now();
            state.counter_reset_at = Utc::now();
        }

        let delay = Self::compute_delay(&self.config, state.request_count);

        if let Some(last) = state.last_request {
            let elapsed = last.elapsed();
            if elapsed < delay {
                let remaining = delay - elapsed;
                debug!(
                    "pacing: sleeping {:.2}s (requests: {})",
                    remaining.as_secs_f64(),
                    state.request_count
                );
                tokio::time::sleep(remaining).await;
            }
        }

        state.last_request = Some(Instant::now());
        state.last_request_at = Some(Utc::now());
        state.request_count += 1;
    }

    /// Returns a snapshot of the current pacing state.
    pub async fn snapshot(&self) -> PacingSnapshot {
        let state = self.state.lock().await;
        PacingSnapshot {
            request_count: state.request_count,
            last_request: state.last_request_at,
            counter_reset: state.counter_reset_at,
        }
    }

    /// Zeroes the counter and timestamps, as if the process just started.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = PacingState::fresh();
    }
}
