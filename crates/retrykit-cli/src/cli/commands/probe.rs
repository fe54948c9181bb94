//! `retrykit probe <url>` – HEAD request under the retry loop.

use anyhow::{bail, Result};
use retrykit_core::probe;
use retrykit_core::{classify_network_error, with_retry, RetryConfig};
use std::time::Duration;

pub async fn run_probe(url: &str, timeout_secs: u64, retry: &RetryConfig) -> Result<()> {
    let timeout = Duration::from_secs(timeout_secs.max(1));
    let label = format!("HEAD {url}");
    let outcome = with_retry(
        || probe::head_async(url.to_string(), timeout),
        retry,
        Some(label.as_str()),
    )
    .await;

    match outcome {
        Ok(resp) => {
            let size = resp
                .content_length
                .map(|n| format!("{n} bytes"))
                .unwrap_or_else(|| "unknown size".to_string());
            println!("{} {} ({})", resp.status, url, size);
            Ok(())
        }
        Err(err) => {
            let c = classify_network_error(Some(&err));
            eprintln!("{} [{}]", c.user_message, c.kind.as_str());
            bail!("probe {} failed: {}", url, err)
        }
    }
}
