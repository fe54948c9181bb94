//! Wrap an API function so every call goes through the retry loop.

use std::future::Future;

use super::error::{ConfigError, OperationError};
use super::policy::RetryConfig;
use super::run::RetryExecutor;

/// Label for callables without a usable name (closures, fn pointers, boxed
/// trait objects).
pub const ANONYMOUS_API_CALL: &str = "API call";

/// An API function bundled with the executor that retries it.
///
/// Arguments are passed as a single value (a tuple for several positional
/// arguments) and handed to the function unchanged on every attempt, so
/// they must be `Clone`.
pub struct RetryableApiCall<F> {
    api_call: F,
    label: String,
    executor: RetryExecutor,
}

impl<F> std::fmt::Debug for RetryableApiCall<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryableApiCall")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Wrap `api_call` with the default executor for `config`. The diagnostic
/// label is the function's name, or `"API call"` for anything anonymous.
pub fn create_retryable_api_call<F>(
    api_call: F,
    config: RetryConfig,
) -> Result<RetryableApiCall<F>, ConfigError> {
    Ok(RetryableApiCall::new(api_call, RetryExecutor::try_new(config)?))
}

impl<F> RetryableApiCall<F> {
    pub fn new(api_call: F, executor: RetryExecutor) -> Self {
        Self {
            api_call,
            label: callable_name::<F>(),
            executor,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    /// Call the wrapped function with `args`, retrying transient failures.
    pub async fn call<A, Fut, T>(&self, args: A) -> Result<T, OperationError>
    where
        F: Fn(A) -> Fut,
        A: Clone,
        Fut: Future<Output = Result<T, OperationError>>,
    {
        self.executor
            .run(&self.label, || (self.api_call)(args.clone()))
            .await
    }
}

/// Last path segment of a fn item's type name (`crate::api::fetch_user` ->
/// `fetch_user`); anything else is anonymous.
///
/// Fn items are the only zero-sized callables whose type name is their path.
/// Fn pointers (`fn(..) -> ..`), boxed trait objects and closures are not.
fn callable_name<F>() -> String {
    let full = std::any::type_name::<F>();
    let fn_item = std::mem::size_of::<F>() == 0
        && !full.starts_with("fn(")
        && !full.contains("{{closure}}")
        && !full.contains("dyn ");
    let path = full.split('<').next().unwrap_or(full);
    let name = path.rsplit("::").next().unwrap_or(path);
    let is_ident = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if fn_item && is_ident {
        name.to_string()
    } else {
        ANONYMOUS_API_CALL.to_string()
    }
}
