//! Classify operation errors: the retry predicate and the user-facing taxonomy.

use serde::Serialize;

use super::error::{ConnectionCode, OperationError};
use super::policy::RetryConfig;

const MSG_NETWORK: &str =
    "Unable to connect to the server. Please check your internet connection and try again.";
const MSG_TIMEOUT: &str = "The request is taking longer than expected. Please try again.";
const MSG_SERVER: &str =
    "The server is temporarily unavailable. Please try again in a few moments.";
const MSG_RATE_LIMIT: &str = "Too many requests. Please wait a moment and try again.";
const MSG_CLIENT: &str = "Invalid request. Please check your input and try again.";
const MSG_UNKNOWN: &str = "An unexpected error occurred. Please try again.";

/// Broad category of a failure, for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    NetworkConnectivity,
    Timeout,
    ServerError,
    RateLimit,
    ClientError,
    Unknown,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NetworkConnectivity => "network_connectivity",
            ErrorType::Timeout => "timeout",
            ErrorType::ServerError => "server_error",
            ErrorType::RateLimit => "rate_limit",
            ErrorType::ClientError => "client_error",
            ErrorType::Unknown => "unknown",
        }
    }
}

/// User-facing verdict on an error.
///
/// `should_retry` is a hint for the UI ("try again" affordance). The retry loop
/// does not consult it; it uses the stricter [`is_retryable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorClassification {
    #[serde(rename = "type")]
    pub kind: ErrorType,
    pub user_message: String,
    pub should_retry: bool,
}

impl ErrorClassification {
    fn new(kind: ErrorType, user_message: impl Into<String>, should_retry: bool) -> Self {
        Self {
            kind,
            user_message: user_message.into(),
            should_retry,
        }
    }
}

/// Whether the retry loop should try `error` again under `config`.
///
/// Any one of: a configured message fragment appears in the message, the
/// status is in the configured set, or the connection code is one of the
/// fixed transient codes.
pub fn is_retryable(error: &OperationError, config: &RetryConfig) -> bool {
    let message = error.message_lowercase();
    if config
        .network_error_messages
        .iter()
        .any(|fragment| !fragment.is_empty() && message.contains(fragment.as_str()))
    {
        return true;
    }
    if let Some(status) = error.status() {
        if config.retryable_status_codes.contains(&status) {
            return true;
        }
    }
    error
        .connection_code()
        .is_some_and(|code| code.is_transient())
}

/// Map an error (or its absence) to a category and a message fit for end users.
/// First matching rule wins.
pub fn classify_network_error(error: Option<&OperationError>) -> ErrorClassification {
    let Some(error) = error else {
        return ErrorClassification::new(ErrorType::Unknown, MSG_UNKNOWN, false);
    };

    if let OperationError::InvalidConfig { .. } = error {
        return ErrorClassification::new(ErrorType::Unknown, MSG_UNKNOWN, false);
    }

    let code = error.connection_code();
    let status = error.status();

    if error.message_lowercase().contains("network error")
        || matches!(
            code,
            Some(ConnectionCode::ConnRefused) | Some(ConnectionCode::NotFound)
        )
    {
        return ErrorClassification::new(ErrorType::NetworkConnectivity, MSG_NETWORK, true);
    }

    if code == Some(ConnectionCode::TimedOut) || status == Some(408) {
        return ErrorClassification::new(ErrorType::Timeout, MSG_TIMEOUT, true);
    }

    match status {
        Some(s) if s >= 500 => ErrorClassification::new(ErrorType::ServerError, MSG_SERVER, true),
        Some(429) => ErrorClassification::new(ErrorType::RateLimit, MSG_RATE_LIMIT, true),
        Some(400..=499) => ErrorClassification::new(
            ErrorType::ClientError,
            error.server_message().unwrap_or(MSG_CLIENT),
            false,
        ),
        _ => ErrorClassification::new(ErrorType::Unknown, MSG_UNKNOWN, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::error::ConfigError;

    fn cfg() -> RetryConfig {
        RetryConfig::default()
    }

    #[test]
    fn retryable_by_status() {
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(is_retryable(&OperationError::http(status), &cfg()), "{status}");
        }
    }

    #[test]
    fn permanent_statuses_not_retryable() {
        for status in [400, 401, 403, 404, 409, 422, 423, 501] {
            assert!(!is_retryable(&OperationError::http(status), &cfg()), "{status}");
        }
    }

    #[test]
    fn retryable_by_fixed_connection_code() {
        for code in ["ECONNREFUSED", "ENOTFOUND", "ETIMEDOUT", "ECONNRESET"] {
            let e = OperationError::Network {
                code: Some(code.into()),
                message: "socket hang up".to_string(),
            };
            assert!(is_retryable(&e, &cfg()), "{code}");
        }
        let e = OperationError::Network {
            code: Some("EPIPE".into()),
            message: "broken pipe".to_string(),
        };
        assert!(!is_retryable(&e, &cfg()));
    }

    #[test]
    fn connection_codes_ignore_configured_sets() {
        let mut c = cfg();
        c.network_error_messages.clear();
        c.retryable_status_codes.clear();
        let e = OperationError::Network {
            code: Some(ConnectionCode::ConnReset),
            message: "socket hang up".to_string(),
        };
        assert!(is_retryable(&e, &c));
        assert!(!is_retryable(&OperationError::http(503), &c));
    }

    #[test]
    fn retryable_by_message_case_insensitive() {
        assert!(is_retryable(&OperationError::generic("Network Error"), &cfg()));
        assert!(is_retryable(&OperationError::generic("TypeError: Failed to fetch"), &cfg()));
        assert!(is_retryable(&OperationError::timeout("Timeout of 5000ms exceeded"), &cfg()));
        assert!(!is_retryable(&OperationError::generic("invalid JSON"), &cfg()));
    }

    #[test]
    fn custom_message_fragments_are_honored() {
        let mut c = cfg();
        c.network_error_messages.push("socket hang up".to_string());
        assert!(is_retryable(&OperationError::generic("socket hang up"), &c));
    }

    #[test]
    fn classify_none_is_unknown_without_retry() {
        let c = classify_network_error(None);
        assert_eq!(c.kind, ErrorType::Unknown);
        assert_eq!(c.user_message, MSG_UNKNOWN);
        assert!(!c.should_retry);
    }

    #[test]
    fn classify_table() {
        use ErrorType::*;
        use OperationError as E;
        let cases: Vec<(OperationError, ErrorType, &str, bool)> = vec![
            (E::connection("ECONNREFUSED"), NetworkConnectivity, MSG_NETWORK, true),
            (E::connection("ENOTFOUND"), NetworkConnectivity, MSG_NETWORK, true),
            (E::network("Network Error"), NetworkConnectivity, MSG_NETWORK, true),
            (E::connection("ETIMEDOUT"), Timeout, MSG_TIMEOUT, true),
            (E::timeout("timeout of 100ms exceeded"), Timeout, MSG_TIMEOUT, true),
            (E::http(408), Timeout, MSG_TIMEOUT, true),
            (E::http(503), ServerError, MSG_SERVER, true),
            (E::http(500), ServerError, MSG_SERVER, true),
            (E::http(429), RateLimit, MSG_RATE_LIMIT, true),
            (E::http_with_message(404, "Not found"), ClientError, "Not found", false),
            (E::http(400), ClientError, MSG_CLIENT, false),
            (E::connection("ECONNRESET"), Unknown, MSG_UNKNOWN, true),
            (E::generic("boom"), Unknown, MSG_UNKNOWN, true),
            (E::http(302), Unknown, MSG_UNKNOWN, true),
            (E::from(ConfigError::ZeroInitialDelay), Unknown, MSG_UNKNOWN, false),
        ];
        for (error, kind, message, should_retry) in cases {
            let c = classify_network_error(Some(&error));
            assert_eq!(c.kind, kind, "{error:?}");
            assert_eq!(c.user_message, message, "{error:?}");
            assert_eq!(c.should_retry, should_retry, "{error:?}");
        }
    }

    #[test]
    fn invalid_config_is_never_retryable() {
        let e = OperationError::from(ConfigError::InvalidMultiplier(0.0));
        assert!(!is_retryable(&e, &cfg()));
    }

    #[test]
    fn classify_is_stable_for_same_input() {
        let e = OperationError::http_with_message(422, "Email already taken");
        assert_eq!(classify_network_error(Some(&e)), classify_network_error(Some(&e)));
    }

    #[test]
    fn classification_serializes_with_snake_case_type() {
        let c = classify_network_error(Some(&OperationError::http(429)));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "rate_limit");
        assert_eq!(json["should_retry"], true);
        assert_eq!(ErrorType::RateLimit.as_str(), "rate_limit");
    }
}
