//! `retrykit classify` – show how an error would be presented and retried.

use anyhow::Result;
use clap::Args;
use retrykit_core::retry::ConnectionCode;
use retrykit_core::{classify_network_error, is_retryable, OperationError, RetryConfig};

#[derive(Debug, Clone, Default, Args)]
pub struct ClassifyArgs {
    /// HTTP status the server answered with.
    #[arg(long)]
    pub status: Option<u16>,
    /// Connection error code, e.g. ECONNREFUSED or ETIMEDOUT.
    #[arg(long, conflicts_with = "status")]
    pub code: Option<String>,
    /// Error message reported by the client.
    #[arg(long, conflicts_with = "status")]
    pub message: Option<String>,
    /// Explanation the server put in the response body.
    #[arg(long, requires = "status")]
    pub server_message: Option<String>,
    /// Print the classification as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ClassifyArgs {
    /// The error described by the flags; `None` when no flag describes one.
    pub fn to_error(&self) -> Option<OperationError> {
        if let Some(status) = self.status {
            return Some(OperationError::Http {
                status,
                message: self.server_message.clone(),
            });
        }
        if let Some(code) = self.code.as_deref() {
            let code = ConnectionCode::from(code);
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| code.as_str().to_string());
            return Some(match code {
                ConnectionCode::TimedOut => OperationError::Timeout { message },
                code => OperationError::Network {
                    code: Some(code),
                    message,
                },
            });
        }
        self.message.as_deref().map(OperationError::generic)
    }
}

pub fn run_classify(args: &ClassifyArgs, retry: &RetryConfig) -> Result<()> {
    let error = args.to_error();
    let classification = classify_network_error(error.as_ref());
    let retried = error.as_ref().is_some_and(|e| is_retryable(e, retry));

    if args.json {
        let out = serde_json::json!({
            "classification": classification,
            "retried": retried,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match &error {
        Some(e) => println!("error:        {}", e),
        None => println!("error:        (none)"),
    }
    println!("type:         {}", classification.kind.as_str());
    println!("message:      {}", classification.user_message);
    println!("should retry: {}", classification.should_retry);
    println!(
        "retried:      {}",
        if retried {
            format!("yes (up to {} retries)", retry.max_retries)
        } else {
            "no".to_string()
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_means_no_error() {
        assert_eq!(ClassifyArgs::default().to_error(), None);
    }

    #[test]
    fn status_carries_server_message() {
        let args = ClassifyArgs {
            status: Some(404),
            server_message: Some("Not found".into()),
            ..Default::default()
        };
        assert_eq!(
            args.to_error(),
            Some(OperationError::http_with_message(404, "Not found"))
        );
    }

    #[test]
    fn code_with_message_keeps_both() {
        let args = ClassifyArgs {
            code: Some("ECONNRESET".into()),
            message: Some("socket hang up".into()),
            ..Default::default()
        };
        assert_eq!(
            args.to_error(),
            Some(OperationError::Network {
                code: Some(ConnectionCode::ConnReset),
                message: "socket hang up".into(),
            })
        );
    }

    #[test]
    fn etimedout_becomes_timeout() {
        let args = ClassifyArgs {
            code: Some("etimedout".into()),
            ..Default::default()
        };
        assert_eq!(args.to_error(), Some(OperationError::timeout("ETIMEDOUT")));
    }

    #[test]
    fn message_only_is_generic() {
        let args = ClassifyArgs {
            message: Some("Network Error".into()),
            ..Default::default()
        };
        assert_eq!(args.to_error(), Some(OperationError::generic("Network Error")));
    }
}
