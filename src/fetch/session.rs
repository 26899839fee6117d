// src/fetch/session.rs

use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::{
    sync::Mutex,
    thread::sleep,
    time::{Duration, Instant},
};
use tracing::{debug, trace, warn};
use url::Url;

use super::PageSource;
use crate::config::Config;
use crate::error::FetchError;

/// Shared, throttled HTTP session for baseball-reference.
///
/// One instance is meant to live for the whole process; the client pools
/// connections and the throttle spaces requests across every caller.
pub struct BrefSession {
    client: Client,
    base: Url,
    max_retries: u32,
    initial_backoff_ms: u64,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl BrefSession {
    pub fn new(cfg: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(FetchError::Build)?;
        Ok(Self {
            client,
            base: parse_base(&cfg.base_url)?,
            max_retries: cfg.max_retries,
            initial_backoff_ms: cfg.initial_backoff_ms,
            min_interval: min_interval(cfg.max_requests_per_minute),
            last_request: Mutex::new(None),
        })
    }

    /// Block until the throttle allows another request, then claim the slot.
    fn throttle(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let wait = wait_needed(*last, Instant::now(), self.min_interval);
        if !wait.is_zero() {
            trace!(wait_ms = wait.as_millis() as u64, "throttling");
            sleep(wait);
        }
        *last = Some(Instant::now());
    }

    fn get_once(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.throttle();
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let bytes = resp.bytes().map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

impl PageSource for BrefSession {
    fn base_url(&self) -> &Url {
        &self.base
    }

    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let mut attempts = 0;
        loop {
            match self.get_once(url) {
                Ok(body) => {
                    debug!(%url, bytes = body.len(), "fetched");
                    return Ok(body);
                }
                Err(e) if attempts < self.max_retries && is_retryable(&e) => {
                    attempts += 1;
                    let delay = backoff(self.initial_backoff_ms, attempts);
                    warn!(%url, attempt = attempts, delay_ms = delay.as_millis() as u64, error = %e, "Retrying");
                    sleep(delay);
                }
                Err(e) => {
                    debug!(%url, attempts = attempts + 1, error = %e, "giving up");
                    return Err(e);
                }
            }
        }
    }
}

/// Box score paths are joined onto the base, so it must end in `/` or
/// `Url::join` would drop its last path segment.
fn parse_base(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

fn min_interval(max_per_minute: u32) -> Duration {
    if max_per_minute == 0 {
        Duration::ZERO
    } else {
        Duration::from_secs(60) / max_per_minute
    }
}

fn wait_needed(last: Option<Instant>, now: Instant, min_interval: Duration) -> Duration {
    match last {
        Some(prev) => min_interval.saturating_sub(now.saturating_duration_since(prev)),
        None => Duration::ZERO,
    }
}

fn backoff(initial_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(initial_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1))))
}

fn is_retryable(e: &FetchError) -> bool {
    match e {
        FetchError::Network { .. } => true,
        FetchError::Status { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn ten_per_minute_is_six_seconds_apart() {
        assert_eq!(min_interval(10), Duration::from_secs(6));
        assert_eq!(min_interval(0), Duration::ZERO);
    }

    #[test]
    fn first_request_never_waits() {
        let now = Instant::now();
        assert_eq!(wait_needed(None, now, Duration::from_secs(6)), Duration::ZERO);
    }

    #[test]
    fn waits_for_the_remainder_of_the_interval() {
        let prev = Instant::now();
        let now = prev + Duration::from_secs(2);
        assert_eq!(
            wait_needed(Some(prev), now, Duration::from_secs(6)),
            Duration::from_secs(4)
        );
        let later = prev + Duration::from_secs(10);
        assert_eq!(
            wait_needed(Some(prev), later, Duration::from_secs(6)),
            Duration::ZERO
        );
    }

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff(500, 1), Duration::from_millis(500));
        assert_eq!(backoff(500, 2), Duration::from_millis(1000));
        assert_eq!(backoff(500, 3), Duration::from_millis(2000));
    }

    #[test]
    fn only_throttling_and_server_errors_retry() {
        let status = |s| FetchError::Status {
            url: "http://x".into(),
            status: s,
        };
        assert!(is_retryable(&status(StatusCode::TOO_MANY_REQUESTS)));
        assert!(is_retryable(&status(StatusCode::BAD_GATEWAY)));
        assert!(!is_retryable(&status(StatusCode::NOT_FOUND)));
        assert!(!is_retryable(&FetchError::EmptyBody { url: "http://x".into() }));
    }

    #[test]
    fn session_uses_configured_base() {
        let cfg = Config {
            base_url: "http://localhost:9".into(),
            ..Config::default()
        };
        let session = BrefSession::new(&cfg).unwrap();
        assert_eq!(session.base_url().as_str(), "http://localhost:9/");
    }

    #[test]
    fn base_path_prefix_survives_join() {
        let cfg = Config {
            base_url: "http://proxy.test/bref".into(),
            ..Config::default()
        };
        let session = BrefSession::new(&cfg).unwrap();
        let url = session.base_url().join("boxes/DET/DET201007190.shtml").unwrap();
        assert_eq!(url.as_str(), "http://proxy.test/bref/boxes/DET/DET201007190.shtml");
    }

    /// Local HTTP server answering request `n` with `status_for(n)`.
    /// Returns the base URL and a count of requests seen.
    fn serve(status_for: fn(usize) -> u16) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let status = status_for(counter.fetch_add(1, Ordering::SeqCst));
                let body = "<html><body><table></table></body></html>";
                let resp = format!(
                    "HTTP/1.1 {status} Test\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(resp.as_bytes());
            }
        });
        (format!("http://{addr}"), hits)
    }

    fn fast_session(base: &str, max_retries: u32) -> BrefSession {
        let cfg = Config {
            base_url: base.to_string(),
            max_retries,
            initial_backoff_ms: 1,
            max_requests_per_minute: 0,
            timeout_secs: 5,
            ..Config::default()
        };
        BrefSession::new(&cfg).unwrap()
    }

    fn page_url(session: &BrefSession) -> Url {
        session.base_url().join("boxes/DET/DET201007190.shtml").unwrap()
    }

    #[test]
    fn server_error_then_success_is_retried() {
        let (base, hits) = serve(|n| if n == 0 { 503 } else { 200 });
        let session = fast_session(&base, 3);
        let body = session.get(&page_url(&session)).unwrap();
        assert!(String::from_utf8(body).unwrap().contains("<table>"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn not_found_fails_without_retrying() {
        let (base, hits) = serve(|_| 404);
        let session = fast_session(&base, 3);
        let err = session.get(&page_url(&session)).unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status == StatusCode::NOT_FOUND
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retries_stop_at_the_configured_budget() {
        let (base, hits) = serve(|_| 503);
        let session = fast_session(&base, 2);
        let err = session.get(&page_url(&session)).unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn too_many_requests_is_retried() {
        let (base, hits) = serve(|n| if n < 2 { 429 } else { 200 });
        let session = fast_session(&base, 2);
        assert!(session.get(&page_url(&session)).is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
