//! HTTP reference gateway.
//!
//! Fetches `GET {base_url}/companies/{id}/integrations/{type}/{provider}/reference`
//! and expects the same JSON document the file gateway reads. Connection
//! failures and 5xx responses are retried a bounded number of times, and
//! never past the configured deadline.

use std::thread;
use std::time::{Duration, Instant};

use payroll_model::{IntegrationKey, ReferenceData};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{debug, warn};

use crate::error::{ReferenceError, Result};
use crate::gateway::ReferenceGateway;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts, including the first.
    pub attempts: u32,
    pub retry_delay: Duration,
    /// Budget for one fetch, retries and delays included.
    pub deadline: Option<Duration>,
}

impl HttpGatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_retries(mut self, attempts: u32, retry_delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stop requesting once `deadline` has passed since the fetch began.
    /// Each attempt gets at most the time that is left.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

pub struct HttpGateway {
    client: Client,
    config: HttpGatewayConfig,
}

impl HttpGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn reference_url(&self, key: &IntegrationKey) -> String {
        format!(
            "{}/companies/{}/integrations/{}/{}/reference",
            self.config.base_url.trim_end_matches('/'),
            key.company_id,
            key.integration_type,
            key.provider
        )
    }

    /// Time left before the deadline; unbounded without one.
    fn time_left(&self, started: Instant) -> Duration {
        self.config
            .deadline
            .map_or(Duration::MAX, |deadline| deadline.saturating_sub(started.elapsed()))
    }

    fn fetch_once(&self, url: &str, timeout: Duration) -> Result<ReferenceData> {
        let mut request = self
            .client
            .get(url)
            .timeout(timeout)
            .header(USER_AGENT, format!("payroll-recon/{}", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json");
        if let Some(api_key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ReferenceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|source| ReferenceError::Json {
            origin: url.to_string(),
            source,
        })
    }
}

impl ReferenceGateway for HttpGateway {
    fn fetch(&self, key: &IntegrationKey) -> Result<ReferenceData> {
        let url = self.reference_url(key);
        let started = Instant::now();
        let mut attempt = 1;
        loop {
            let left = self.time_left(started);
            if left.is_zero() {
                return Err(ReferenceError::Timeout {
                    company_id: key.company_id,
                    timeout_ms: started.elapsed().as_millis(),
                });
            }
            debug!(company_id = key.company_id, attempt, "requesting reference data");
            match self.fetch_once(&url, left.min(self.config.timeout)) {
                Err(ReferenceError::Status { status: 404, .. }) => {
                    return Err(ReferenceError::NotFound {
                        company_id: key.company_id,
                    });
                }
                Err(err)
                    if err.is_retryable()
                        && attempt < self.config.attempts
                        && self.time_left(started) > self.config.retry_delay =>
                {
                    warn!(
                        company_id = key.company_id,
                        attempt,
                        error = %err,
                        "reference request failed, retrying"
                    );
                    thread::sleep(self.config.retry_delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn describe(&self) -> String {
        format!("http {}", self.config.base_url)
    }
}
