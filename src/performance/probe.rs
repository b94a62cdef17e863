use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use tokio::time::timeout;
use url::Url;

use crate::{config::ProbeConfig, Instance, ProbeOutcome, Result};

const MIN_BODY_LEN: usize = 1000;
const TIMELINE_MARKER: &[u8] = b"timeline";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// One bounded-time health check against one mirror.
///
/// Failure carries no cause: timeouts, network errors and bad pages all come
/// back as `None`.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, instance: &Instance) -> Option<ProbeOutcome>;
}

/// A real mirror serves its timeline page: 200, a non-trivial body, and the
/// `timeline` marker somewhere in the markup. Length is counted in raw bytes.
pub fn is_valid_timeline_response(status: StatusCode, body: &[u8]) -> bool {
    status == StatusCode::OK
        && body.len() > MIN_BODY_LEN
        && body.windows(TIMELINE_MARKER.len()).any(|window| window == TIMELINE_MARKER)
}

pub struct HttpProbe {
    timeout_duration: Duration,
    test_handle: String,
    scheme: String,
    user_agent: String,
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &ProbeConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &ProbeConfig, client: reqwest::Client) -> Self {
        Self {
            timeout_duration: config.timeout,
            test_handle: config.test_handle.clone(),
            scheme: config.scheme.clone(),
            user_agent: config.user_agent.clone(),
            client,
        }
    }

    pub fn probe_url(&self, instance: &Instance) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}://{}/{}",
            self.scheme, instance, self.test_handle
        ))?)
    }

    /// Sends the request and reads the whole body. Latency covers both.
    async fn fetch_timeline(&self, url: Url) -> Result<(StatusCode, Vec<u8>, u64)> {
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ACCEPT, ACCEPT_HTML)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        let latency = start.elapsed().as_millis() as u64;
        Ok((status, body, latency))
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self, instance: &Instance) -> Option<ProbeOutcome> {
        let url = match self.probe_url(instance) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(instance = %instance, error = %e, "Probe URL invalid");
                return None;
            }
        };

        // Dropping the inner future on timeout aborts the request.
        match timeout(self.timeout_duration, self.fetch_timeline(url)).await {
            Ok(Ok((status, body, latency_ms))) => {
                if is_valid_timeline_response(status, &body) {
                    Some(ProbeOutcome {
                        instance: instance.clone(),
                        latency_ms,
                    })
                } else {
                    tracing::debug!(
                        instance = %instance,
                        status = status.as_u16(),
                        body_len = body.len(),
                        "Probe response rejected"
                    );
                    None
                }
            }
            Ok(Err(e)) => {
                tracing::debug!(instance = %instance, error = %e, "Probe request failed");
                None
            }
            Err(_) => {
                tracing::debug!(
                    instance = %instance,
                    timeout_ms = self.timeout_duration.as_millis() as u64,
                    "Probe timed out"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(len: usize, marker: bool) -> Vec<u8> {
        let mut body = if marker { b"<div class=\"timeline\">".to_vec() } else { Vec::new() };
        body.resize(len, b'x');
        body
    }

    #[test]
    fn accepts_only_full_timeline_pages() {
        assert!(is_valid_timeline_response(StatusCode::OK, &page(1001, true)));
        assert!(!is_valid_timeline_response(StatusCode::OK, &page(1000, true)));
        assert!(!is_valid_timeline_response(StatusCode::OK, &page(5000, false)));
        assert!(!is_valid_timeline_response(StatusCode::CREATED, &page(5000, true)));
        assert!(!is_valid_timeline_response(StatusCode::SERVICE_UNAVAILABLE, &page(5000, true)));
    }

    #[test]
    fn length_is_counted_in_raw_bytes() {
        let mut body = b"<div class=\"timeline\">".to_vec();
        body.resize(1000, 0xFF);
        assert!(!is_valid_timeline_response(StatusCode::OK, &body));

        body.push(0xFF);
        assert!(is_valid_timeline_response(StatusCode::OK, &body));
    }

    #[test]
    fn probe_url_uses_scheme_and_test_handle() {
        let probe = HttpProbe::new(&ProbeConfig::default());
        let url = probe.probe_url(&Instance::new("nitter.net")).unwrap();
        assert_eq!(url.as_str(), "https://nitter.net/twitter");
    }
}
