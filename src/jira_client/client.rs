use std::time::{Duration, Instant};

use backoff::ExponentialBackoffBuilder;
use backoff::backoff::Backoff;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::error::{Error, JiraError};

use super::rest::{api_message, body_preview};

const MAX_ATTEMPTS: usize = 3;
const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone, Debug)]
pub struct JiraClient {
    http: reqwest::Client,
    base: Url,
    username: String,
    password: SecretString,
    timeout: Duration,
}

impl JiraClient {
    /// Build a `JiraClient` configured with the supplied parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTPS is required but the URL uses HTTP, or if
    /// the underlying HTTP client fails to build.
    pub fn new(
        base: Url,
        username: String,
        password: SecretString,
        timeout: Duration,
        connect_timeout: Duration,
        insecure_http: bool,
    ) -> Result<Self> {
        if base.scheme() != "https" && !insecure_http {
            return Err(Error::Config(crate::error::ConfigError::InvalidField {
                field: "jira.url",
                message: "only https URLs are accepted without --insecure".to_string(),
            }));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .user_agent(concat!("icinga2jira/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30));

        if !insecure_http {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|err| JiraError::Client { source: err })?;

        Ok(Self {
            http,
            base,
            username,
            password,
            timeout,
        })
    }

    pub(super) async fn call<T>(
        &self,
        op: &'static str,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.execute(op, method, segments, body).await?;
        serde_json::from_slice(&bytes).map_err(|err| {
            JiraError::Json {
                message: format!(
                    "error decoding response body: {err}; body preview: {}",
                    body_preview(&bytes)
                ),
            }
            .into()
        })
    }

    pub(super) async fn call_no_content(
        &self,
        op: &'static str,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<()> {
        self.execute(op, method, segments, body).await.map(|_| ())
    }

    // One bounded-retry request: transient transport failures and 5xx/408
    // responses are retried with exponential backoff, everything else
    // surfaces immediately. Jira error containers become `JiraError::Api`.
    #[allow(clippy::too_many_lines)]
    async fn execute(
        &self,
        op: &'static str,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Vec<u8>> {
        let url = self.endpoint(segments)?;
        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(200))
            .with_multiplier(2.0)
            .with_randomization_factor(0.25)
            .with_max_interval(Duration::from_secs(2))
            .with_max_elapsed_time(Some(self.timeout))
            .build();

        for attempt in 1..=MAX_ATTEMPTS {
            let correlation_id = Uuid::now_v7().to_string();
            let started = Instant::now();
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .basic_auth(&self.username, Some(self.password.expose_secret()))
                .header(CORRELATION_HEADER, &correlation_id);
            if let Some(payload) = body {
                request = request.json(payload);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    let jerr = JiraError::from(err);
                    if attempt == MAX_ATTEMPTS {
                        return Err(JiraError::RetryExhausted {
                            source: Box::new(jerr),
                        }
                        .into());
                    }
                    if let Some(delay) = backoff.next_backoff() {
                        warn!(
                            op,
                            %correlation_id,
                            attempt,
                            delay_ms = delay.as_millis(),
                            error = %jerr,
                            "retrying after transport error"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(jerr.into());
                }
            };

            let status = response.status();
            if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
                let jerr = JiraError::HttpStatus { status };
                if attempt == MAX_ATTEMPTS {
                    return Err(JiraError::RetryExhausted {
                        source: Box::new(jerr),
                    }
                    .into());
                }
                if let Some(delay) = backoff.next_backoff() {
                    warn!(
                        op,
                        %correlation_id,
                        attempt,
                        delay_ms = delay.as_millis(),
                        status = %status,
                        "retrying after server error"
                    );
                    sleep(delay).await;
                    continue;
                }
                return Err(jerr.into());
            }

            if !status.is_success() {
                let message = match response.bytes().await {
                    Ok(bytes) => api_message(&bytes),
                    Err(_) => None,
                };
                return Err(match message {
                    Some(message) => JiraError::Api { status, message },
                    None => JiraError::HttpStatus { status },
                }
                .into());
            }

            let bytes = match response.bytes().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    let jerr = JiraError::from(err);
                    if attempt == MAX_ATTEMPTS {
                        return Err(JiraError::RetryExhausted {
                            source: Box::new(jerr),
                        }
                        .into());
                    }
                    if let Some(delay) = backoff.next_backoff() {
                        warn!(
                            op,
                            %correlation_id,
                            attempt,
                            delay_ms = delay.as_millis(),
                            error = %jerr,
                            "retrying after body read error"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(jerr.into());
                }
            };

            debug!(
                op,
                %correlation_id,
                attempt,
                latency_ms = started.elapsed().as_millis(),
                "jira call succeeded"
            );
            return Ok(bytes.to_vec());
        }
        unreachable!("retry loop should have returned before reaching this point")
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| JiraError::InvalidField {
                field: "jira.url",
                message: "URL cannot serve as a base".to_string(),
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }
}
