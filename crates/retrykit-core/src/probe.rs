//! HTTP HEAD probe.
//!
//! A real network operation for the retry loop: uses the curl crate (libcurl)
//! to issue a HEAD request and translates transport failures into
//! [`OperationError`] so the retry classifiers can act on them.

use std::str;
use std::time::Duration;

use crate::retry::{ConnectionCode, OperationError};

/// Outcome of a successful HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Final HTTP status (after redirects).
    pub status: u16,
    /// `Content-Length`, if the server sent one.
    pub content_length: Option<u64>,
}

/// Map a curl failure to the error shape the retry loop understands.
pub fn map_curl_error(e: &curl::Error) -> OperationError {
    if e.is_operation_timedout() {
        return OperationError::timeout(e.to_string());
    }
    let code = if e.is_couldnt_connect() {
        Some(ConnectionCode::ConnRefused)
    } else if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        Some(ConnectionCode::NotFound)
    } else if e.is_read_error() || e.is_recv_error() || e.is_send_error() || e.is_got_nothing() {
        Some(ConnectionCode::ConnReset)
    } else {
        None
    };
    match code {
        Some(code) => OperationError::Network {
            code: Some(code),
            message: e.to_string(),
        },
        None => OperationError::generic(e.to_string()),
    }
}

fn parse_content_length(headers: &[String]) -> Option<u64> {
    headers.iter().rev().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Performs a HEAD request against `url`, following redirects.
///
/// Statuses >= 400 are returned as `OperationError::Http`. Runs in the current
/// thread; use [`head_async`] from async code.
pub fn head(url: &str, timeout: Duration) -> Result<ProbeResponse, OperationError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| OperationError::generic(format!("invalid URL {url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(OperationError::generic(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }

    let mut headers: Vec<String> = Vec::new();
    let mut easy = curl::easy::Easy::new();
    let curl_err = |e: curl::Error| map_curl_error(&e);
    easy.url(parsed.as_str()).map_err(curl_err)?;
    easy.nobody(true).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.connect_timeout(timeout.min(Duration::from_secs(15)))
        .map_err(curl_err)?;
    easy.timeout(timeout).map_err(curl_err)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(curl_err)?;
        transfer.perform().map_err(curl_err)?;
    }

    let code = easy.response_code().map_err(curl_err)?;
    let status = u16::try_from(code)
        .map_err(|_| OperationError::generic(format!("invalid HTTP status {code}")))?;
    if status >= 400 {
        return Err(OperationError::http(status));
    }
    Ok(ProbeResponse {
        status,
        content_length: parse_content_length(&headers),
    })
}

/// [`head`] on the blocking pool.
pub async fn head_async(url: String, timeout: Duration) -> Result<ProbeResponse, OperationError> {
    tokio::task::spawn_blocking(move || head(&url, timeout))
        .await
        .map_err(|e| OperationError::generic(format!("probe task join: {e}")))?
}
