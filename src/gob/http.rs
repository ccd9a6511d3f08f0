//! Shared HTTP plumbing for source and review hosts.
//!
//! Both host families speak JSON over HTTPS with an XSSI guard prefix on
//! JSON bodies. Requests carry a bounded timeout and a small retry budget
//! for transient failures; anything else surfaces to the caller unchanged.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::warn;

use crate::error::Error;

/// Bound on any single outbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Total attempts for one logical request.
const MAX_ATTEMPTS: u32 = 3;

/// First retry delay, doubled on each further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// Guard prefix hosts prepend to JSON bodies.
const XSSI_GUARD: &str = ")]}'";

/// Build the shared client used for all requests of one host.
pub fn client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("relog/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("HTTP client construction")
}

/// Normalize an instance argument to a base URL. Bare hosts get `https://`;
/// full URLs pass through so tests can point at local fixtures.
pub fn base_url(instance: &str) -> String {
    let trimmed = instance.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Drop the XSSI guard and the newline that follows it.
pub fn strip_xssi(body: &str) -> &str {
    match body.strip_prefix(XSSI_GUARD) {
        Some(rest) => rest.trim_start_matches(['\r', '\n']),
        None => body,
    }
}

fn transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn transient_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// GET a URL, retrying transient failures (connect errors, timeouts, 429,
/// 5xx) with doubling backoff. Returns the final status and body text;
/// non-2xx statuses are returned rather than mapped, because their meaning
/// depends on the endpoint. An exhausted retry budget surfaces the last
/// failure as a hard error.
pub async fn get_text(client: &Client, url: &str) -> Result<(StatusCode, String), Error> {
    let mut delay = RETRY_BASE_DELAY;
    for attempt in 1..=MAX_ATTEMPTS {
        let failure = match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if !transient_status(status) {
                    let body = response.text().await.map_err(|source| Error::Network {
                        url: url.to_string(),
                        source,
                    })?;
                    return Ok((status, body));
                }
                if attempt == MAX_ATTEMPTS {
                    return Err(Error::Http {
                        url: url.to_string(),
                        status,
                    });
                }
                status.to_string()
            }
            Err(source) => {
                if !transient_error(&source) || attempt == MAX_ATTEMPTS {
                    return Err(Error::Network {
                        url: url.to_string(),
                        source,
                    });
                }
                source.to_string()
            }
        };
        warn!("transient failure on {url} (attempt {attempt}): {failure}");
        tokio::time::sleep(delay).await;
        delay *= 2;
    }
    unreachable!("retry loop always returns")
}
