use std::collections::BTreeSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::ConfigError;

/// Lower bound of the jitter multiplier (inclusive).
pub const JITTER_MIN: f64 = 0.5;
/// Upper bound of the jitter multiplier (exclusive).
pub const JITTER_MAX: f64 = 1.0;

/// HTTP statuses retried by default.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Message fragments that mark an error as a transient network failure.
pub const DEFAULT_NETWORK_ERROR_MESSAGES: [&str; 5] = [
    "network error",
    "failed to fetch",
    "timeout",
    "econnrefused",
    "enotfound",
];

/// Exponential backoff parameters for one retried call.
///
/// Values are immutable once handed to an executor; to change a field, build
/// a new config (see the `with_*` helpers or `config::merge_with_defaults`).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt (3 means up to 4 invocations).
    pub max_retries: u32,
    /// Base delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Growth factor per attempt; must be greater than 1.
    pub backoff_multiplier: f64,
    /// HTTP statuses treated as transient.
    pub retryable_status_codes: BTreeSet<u16>,
    /// Lowercase substrings that mark an error message as transient.
    pub network_error_messages: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            backoff_multiplier: 2.0,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.into_iter().collect(),
            network_error_messages: DEFAULT_NETWORK_ERROR_MESSAGES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// No retries at all: the operation runs exactly once.
    pub fn no_retry() -> Self {
        Self::default().with_max_retries(0)
    }

    /// Total invocations the loop may make.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Check the invariants the delay computation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_delay.is_zero() {
            return Err(ConfigError::ZeroInitialDelay);
        }
        if self.max_delay < self.initial_delay {
            return Err(ConfigError::MaxDelayBelowInitial {
                initial_ms: self.initial_delay.as_millis(),
                max_ms: self.max_delay.as_millis(),
            });
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 1.0 {
            return Err(ConfigError::InvalidMultiplier(self.backoff_multiplier));
        }
        Ok(())
    }
}

/// Source of the jitter multiplier applied to each backoff delay.
pub trait JitterSource: Send {
    /// Returns a multiplier in `[JITTER_MIN, JITTER_MAX)`.
    fn multiplier(&mut self) -> f64;
}

/// Jitter drawn uniformly from a `rand` RNG.
#[derive(Debug, Clone)]
pub struct RandJitter<R>(R);

impl<R: Rng + Send> RandJitter<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RandJitter<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible sequence of draws for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> JitterSource for RandJitter<R> {
    fn multiplier(&mut self) -> f64 {
        self.0.gen_range(JITTER_MIN..JITTER_MAX)
    }
}

/// Constant multiplier; clamped into the jitter range.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn multiplier(&mut self) -> f64 {
        self.0
    }
}

/// `initial_delay * multiplier^attempt` in milliseconds, or `None` when it
/// does not fit in an f64.
fn exponential_ms(attempt: u32, config: &RetryConfig) -> Option<f64> {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base_ms = as_ms(config.initial_delay);
    let ms = base_ms * config.backoff_multiplier.powi(exponent);
    ms.is_finite().then_some(ms)
}

fn as_ms(d: Duration) -> f64 {
    d.as_micros() as f64 / 1000.0
}

fn from_ms(ms: f64) -> Duration {
    Duration::from_micros((ms.max(0.0) * 1000.0).round() as u64)
}

/// Backoff delay before retry number `attempt + 1` (`attempt` is 0-based:
/// the first retry uses exponent 0).
///
/// `min(initial_delay * multiplier^attempt * jitter, max_delay)`, where the
/// jitter multiplier comes fresh from `jitter` on every call.
pub fn calculate_delay(
    attempt: u32,
    config: &RetryConfig,
    jitter: &mut dyn JitterSource,
) -> Duration {
    let factor = jitter.multiplier();
    let factor = if factor.is_finite() {
        factor.clamp(JITTER_MIN, JITTER_MAX)
    } else {
        JITTER_MAX
    };
    let max_ms = as_ms(config.max_delay);
    match exponential_ms(attempt, config) {
        Some(ms) => from_ms((ms * factor).min(max_ms)),
        None => config.max_delay,
    }
}

/// Smallest and largest delay `calculate_delay` can return for `attempt`.
pub fn delay_bounds(attempt: u32, config: &RetryConfig) -> (Duration, Duration) {
    let max_ms = as_ms(config.max_delay);
    match exponential_ms(attempt, config) {
        Some(ms) => (
            from_ms((ms * JITTER_MIN).min(max_ms)),
            from_ms((ms * JITTER_MAX).min(max_ms)),
        ),
        None => (config.max_delay, config.max_delay),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = RetryConfig::default();
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.total_attempts(), 4);
        assert_eq!(c.initial_delay, ms(1000));
        assert_eq!(c.max_delay, ms(30_000));
        assert_eq!(c.backoff_multiplier, 2.0);
        assert_eq!(
            c.retryable_status_codes.iter().copied().collect::<Vec<_>>(),
            vec![408, 429, 500, 502, 503, 504]
        );
        assert!(c.network_error_messages.iter().any(|m| m == "failed to fetch"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_broken_invariants() {
        let c = RetryConfig::default().with_multiplier(1.0);
        assert_eq!(c.validate(), Err(ConfigError::InvalidMultiplier(1.0)));

        let c = RetryConfig::default().with_multiplier(f64::INFINITY);
        assert!(matches!(c.validate(), Err(ConfigError::InvalidMultiplier(_))));

        let c = RetryConfig::default()
            .with_initial_delay(ms(500))
            .with_max_delay(ms(100));
        assert_eq!(
            c.validate(),
            Err(ConfigError::MaxDelayBelowInitial {
                initial_ms: 500,
                max_ms: 100
            })
        );

        let c = RetryConfig::default().with_initial_delay(Duration::ZERO);
        assert_eq!(c.validate(), Err(ConfigError::ZeroInitialDelay));
    }

    #[test]
    fn fixed_jitter_gives_exact_delays() {
        let c = RetryConfig::default();
        assert_eq!(calculate_delay(0, &c, &mut FixedJitter(1.0)), ms(1000));
        assert_eq!(calculate_delay(1, &c, &mut FixedJitter(0.5)), ms(1000));
        assert_eq!(calculate_delay(2, &c, &mut FixedJitter(0.75)), ms(3000));
    }

    #[test]
    fn out_of_range_jitter_is_clamped() {
        let c = RetryConfig::default();
        assert_eq!(calculate_delay(0, &c, &mut FixedJitter(0.0)), ms(500));
        assert_eq!(calculate_delay(0, &c, &mut FixedJitter(7.0)), ms(1000));
        assert_eq!(calculate_delay(0, &c, &mut FixedJitter(f64::NAN)), ms(1000));
    }

    #[test]
    fn delay_is_capped_at_max_delay() {
        let c = RetryConfig::default();
        assert_eq!(calculate_delay(10, &c, &mut FixedJitter(0.5)), ms(30_000));
        assert_eq!(calculate_delay(u32::MAX, &c, &mut FixedJitter(0.9)), ms(30_000));
    }

    #[test]
    fn random_delays_stay_within_bounds() {
        let c = RetryConfig::default();
        let mut jitter = RandJitter::seeded(42);
        for attempt in 0..8 {
            let (lo, hi) = delay_bounds(attempt, &c);
            for _ in 0..200 {
                let d = calculate_delay(attempt, &c, &mut jitter);
                assert!(d >= lo && d <= hi, "attempt {attempt}: {d:?} not in [{lo:?}, {hi:?}]");
                assert!(d <= c.max_delay);
            }
        }
    }

    #[test]
    fn seeded_jitter_is_reproducible() {
        let c = RetryConfig::default();
        let mut a = RandJitter::seeded(7);
        let mut b = RandJitter::seeded(7);
        for attempt in 0..4 {
            assert_eq!(
                calculate_delay(attempt, &c, &mut a),
                calculate_delay(attempt, &c, &mut b)
            );
        }
    }

    #[test]
    fn bounds_follow_exponential_envelope() {
        let c = RetryConfig::default()
            .with_initial_delay(ms(100))
            .with_max_delay(ms(1000));
        assert_eq!(delay_bounds(0, &c), (ms(50), ms(100)));
        assert_eq!(delay_bounds(1, &c), (ms(100), ms(200)));
        assert_eq!(delay_bounds(4, &c), (ms(800), ms(1000)));
        assert_eq!(delay_bounds(5, &c), (ms(1000), ms(1000)));
    }
}
