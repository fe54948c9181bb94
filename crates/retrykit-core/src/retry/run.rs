//! Retry loop: await an operation until success or the policy says stop.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::classify::is_retryable;
use super::error::{ConfigError, OperationError};
use super::observe::{AttemptOutcome, AttemptResult, RetryObserver, TracingObserver};
use super::policy::{calculate_delay, JitterSource, RandJitter, RetryConfig};

/// Label used when the caller gives none.
pub const DEFAULT_OPERATION_NAME: &str = "operation";

/// Reusable retry loop with its own config, jitter source and observer.
///
/// The executor can be shared between tasks; each `run` keeps its attempt
/// counter on its own stack. The jitter source is locked only for the
/// duration of one draw.
pub struct RetryExecutor {
    config: RetryConfig,
    jitter: Mutex<Box<dyn JitterSource>>,
    observer: Arc<dyn RetryObserver>,
}

impl RetryExecutor {
    /// Executor with an entropy-seeded RNG and the tracing observer.
    ///
    /// Fails when `config` breaks an invariant (zero initial delay, max delay
    /// below the initial one, multiplier not above 1).
    pub fn try_new(config: RetryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: RetryConfig) -> Self {
        Self {
            config,
            jitter: Mutex::new(Box::new(RandJitter::from_entropy())),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_jitter(mut self, jitter: impl JitterSource + 'static) -> Self {
        self.jitter = Mutex::new(Box::new(jitter));
        self
    }

    pub fn with_observer(mut self, observer: impl RetryObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn with_shared_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    fn next_delay(&self, attempt: u32) -> Duration {
        let mut jitter = self.jitter.lock().unwrap_or_else(PoisonError::into_inner);
        calculate_delay(attempt, &self.config, jitter.as_mut())
    }

    fn report(&self, operation: &str, attempt: u32, result: AttemptResult<'_>) {
        self.observer.on_attempt(&AttemptOutcome {
            operation,
            attempt,
            max_retries: self.config.max_retries,
            result,
        });
    }

    /// Invoke `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. At most `max_retries + 1` invocations.
    ///
    /// The final error is returned exactly as the operation produced it.
    pub async fn run<F, Fut, T>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> Result<T, OperationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OperationError>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => {
                    self.report(operation_name, attempt, AttemptResult::Succeeded);
                    return Ok(value);
                }
                Err(error) => {
                    let retryable = is_retryable(&error, &self.config);
                    if !retryable || attempt >= self.config.max_retries {
                        self.report(
                            operation_name,
                            attempt,
                            AttemptResult::Failed {
                                error: &error,
                                exhausted: retryable,
                            },
                        );
                        return Err(error);
                    }

                    let delay = self.next_delay(attempt);
                    self.report(
                        operation_name,
                        attempt,
                        AttemptResult::Retrying {
                            error: &error,
                            delay,
                        },
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::with_valid_config(RetryConfig::default())
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Run `operation` with retries under `config`, using default jitter and the
/// tracing observer. `operation_name` defaults to `"operation"`.
///
/// A config that fails validation is reported as
/// [`OperationError::InvalidConfig`] and `operation` is never invoked.
pub async fn with_retry<F, Fut, T>(
    operation: F,
    config: &RetryConfig,
    operation_name: Option<&str>,
) -> Result<T, OperationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OperationError>>,
{
    RetryExecutor::try_new(config.clone())?
        .run(operation_name.unwrap_or(DEFAULT_OPERATION_NAME), operation)
        .await
}
