pub mod config;
pub mod logging;
pub mod probe;
pub mod retry;

pub use retry::{
    classify_network_error, create_retryable_api_call, is_retryable, with_retry,
    ConfigError, ErrorClassification, ErrorType, OperationError, RetryConfig, RetryExecutor,
};
