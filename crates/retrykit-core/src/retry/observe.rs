//! Per-attempt reporting hook for the retry loop.

use std::time::Duration;

use super::error::OperationError;

/// What happened on one invocation of the retried operation.
#[derive(Debug, Clone, Copy)]
pub enum AttemptResult<'a> {
    /// The operation returned a value.
    Succeeded,
    /// The operation failed transiently; the loop will sleep `delay` and retry.
    Retrying {
        error: &'a OperationError,
        delay: Duration,
    },
    /// The operation failed and the error is being returned to the caller.
    /// `exhausted` is true when the error was retryable but no retries were left.
    Failed {
        error: &'a OperationError,
        exhausted: bool,
    },
}

/// One attempt, as seen by a [`RetryObserver`].
#[derive(Debug, Clone, Copy)]
pub struct AttemptOutcome<'a> {
    /// Diagnostic label of the operation.
    pub operation: &'a str,
    /// 0-based attempt index (0 = first invocation).
    pub attempt: u32,
    /// Retry budget of the loop that produced this outcome.
    pub max_retries: u32,
    pub result: AttemptResult<'a>,
}

impl AttemptOutcome<'_> {
    pub fn error(&self) -> Option<&OperationError> {
        match self.result {
            AttemptResult::Succeeded => None,
            AttemptResult::Retrying { error, .. } | AttemptResult::Failed { error, .. } => {
                Some(error)
            }
        }
    }

    /// Delay chosen before the next attempt, if there is one.
    pub fn delay(&self) -> Option<Duration> {
        match self.result {
            AttemptResult::Retrying { delay, .. } => Some(delay),
            _ => None,
        }
    }
}

/// Receives every attempt outcome. Must not block: it runs inline in the loop.
pub trait RetryObserver: Send + Sync {
    fn on_attempt(&self, outcome: &AttemptOutcome<'_>);
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_attempt(&self, outcome: &AttemptOutcome<'_>) {
        let op = outcome.operation;
        let attempt = outcome.attempt;
        match outcome.result {
            AttemptResult::Succeeded if attempt > 0 => {
                tracing::info!(operation = op, attempt, "operation succeeded after retry");
            }
            AttemptResult::Succeeded => {}
            AttemptResult::Retrying { error, delay } => {
                tracing::debug!(
                    operation = op,
                    attempt = attempt + 1,
                    max_retries = outcome.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "retrying operation after backoff"
                );
            }
            AttemptResult::Failed { error, exhausted } if exhausted => {
                tracing::warn!(
                    operation = op,
                    attempts = attempt + 1,
                    error = %error,
                    "operation failed after all retries"
                );
            }
            AttemptResult::Failed { error, .. } => {
                tracing::debug!(
                    operation = op,
                    attempt,
                    error = %error,
                    "operation failed with non-retryable error"
                );
            }
        }
    }
}
