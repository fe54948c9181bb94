//! Error shapes observed at the boundary of a retried operation.

use std::fmt;
use std::time::Duration;

/// Low-level connection code reported by the transport (socket/DNS layer).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionCode {
    /// `ECONNREFUSED`: nothing listening on the remote port.
    ConnRefused,
    /// `ENOTFOUND`: host name did not resolve.
    NotFound,
    /// `ETIMEDOUT`: connect or read timed out.
    TimedOut,
    /// `ECONNRESET`: peer dropped the connection mid-exchange.
    ConnReset,
    /// Any other code, kept verbatim (e.g. `EPIPE`).
    Other(String),
}

impl ConnectionCode {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionCode::ConnRefused => "ECONNREFUSED",
            ConnectionCode::NotFound => "ENOTFOUND",
            ConnectionCode::TimedOut => "ETIMEDOUT",
            ConnectionCode::ConnReset => "ECONNRESET",
            ConnectionCode::Other(code) => code,
        }
    }

    /// True for the fixed set of codes the retry loop always treats as transient.
    /// This set is not affected by `RetryConfig`.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ConnectionCode::Other(_))
    }
}

impl From<&str> for ConnectionCode {
    fn from(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "ECONNREFUSED" => ConnectionCode::ConnRefused,
            "ENOTFOUND" => ConnectionCode::NotFound,
            "ETIMEDOUT" => ConnectionCode::TimedOut,
            "ECONNRESET" => ConnectionCode::ConnReset,
            other => ConnectionCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ConnectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single invocation of a retried operation.
///
/// Callers map whatever their transport reports into one of these shapes;
/// the retry loop and the classifier only ever match on this closed set.
/// The loop hands the value back to the caller untouched once it stops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// Connection-level failure, optionally with the socket error code.
    #[error("{message}")]
    Network {
        code: Option<ConnectionCode>,
        message: String,
    },
    /// The request did not complete in time (implies `ETIMEDOUT`).
    #[error("{message}")]
    Timeout { message: String },
    /// The server answered with a non-success status.
    /// `message` is the explanation the server put in the body, if any.
    #[error("request failed with status code {status}")]
    Http {
        status: u16,
        message: Option<String>,
    },
    /// Anything else.
    #[error("{message}")]
    Generic { message: String },
    /// The retry config was rejected before the operation ever ran.
    #[error("invalid retry config: {reason}")]
    InvalidConfig { reason: String },
}

impl OperationError {
    /// Connection failure with a known code; the message is the code itself.
    pub fn connection(code: impl Into<ConnectionCode>) -> Self {
        let code = code.into();
        OperationError::Network {
            message: code.as_str().to_string(),
            code: Some(code),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        OperationError::Network {
            code: None,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        OperationError::Timeout {
            message: message.into(),
        }
    }

    /// Timeout after `elapsed`, worded the way HTTP clients usually report it.
    pub fn timeout_after(elapsed: Duration) -> Self {
        Self::timeout(format!("timeout of {}ms exceeded", elapsed.as_millis()))
    }

    pub fn http(status: u16) -> Self {
        OperationError::Http {
            status,
            message: None,
        }
    }

    pub fn http_with_message(status: u16, message: impl Into<String>) -> Self {
        OperationError::Http {
            status,
            message: Some(message.into()),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        OperationError::Generic {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            OperationError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Connection code carried by the error. `Timeout` reports `ETIMEDOUT`.
    pub fn connection_code(&self) -> Option<ConnectionCode> {
        match self {
            OperationError::Network { code, .. } => code.clone(),
            OperationError::Timeout { .. } => Some(ConnectionCode::TimedOut),
            OperationError::Http { .. }
            | OperationError::Generic { .. }
            | OperationError::InvalidConfig { .. } => None,
        }
    }

    /// Message provided by the server in the response body.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            OperationError::Http {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m),
            _ => None,
        }
    }

    /// Lowercased display text, used for substring matching.
    pub(crate) fn message_lowercase(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl From<ConfigError> for OperationError {
    fn from(err: ConfigError) -> Self {
        OperationError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

/// Rejected retry configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("initial delay must be positive")]
    ZeroInitialDelay,
    #[error("max delay ({max_ms}ms) is below initial delay ({initial_ms}ms)")]
    MaxDelayBelowInitial { initial_ms: u128, max_ms: u128 },
    #[error("backoff multiplier must be a finite number greater than 1 (got {0})")]
    InvalidMultiplier(f64),
}
