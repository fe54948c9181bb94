//! Retry and backoff.
//!
//! This module holds the retry loop, exponential backoff with jitter, and the
//! two error classifiers: [`is_retryable`], which the loop itself consults,
//! and [`classify_network_error`], which maps errors to user-facing messages
//! for callers that render feedback.

mod api_call;
mod classify;
mod error;
mod observe;
mod policy;
mod run;

pub use api_call::{create_retryable_api_call, RetryableApiCall, ANONYMOUS_API_CALL};
pub use classify::{classify_network_error, is_retryable, ErrorClassification, ErrorType};
pub use error::{ConfigError, ConnectionCode, OperationError};
pub use observe::{AttemptOutcome, AttemptResult, RetryObserver, TracingObserver};
pub use policy::{
    calculate_delay, delay_bounds, FixedJitter, JitterSource, RandJitter, RetryConfig,
    DEFAULT_NETWORK_ERROR_MESSAGES, DEFAULT_RETRYABLE_STATUS_CODES, JITTER_MAX, JITTER_MIN,
};
pub use run::{with_retry, RetryExecutor, DEFAULT_OPERATION_NAME};
