/*
[INPUT]:  HTTP configuration (base URL, timeouts, retries, credentials)
[OUTPUT]: Configured reqwest client and envelope-aware request execution
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::{ConsoleError, Result};
use crate::types::ApiResponse;

/// Default endpoint of the experiment-execution service
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7001";
const REQUEST_ID_HEADER: &str = "x-request-id";
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Extra attempts after the first one for retryable errors
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Credentials for authenticated requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub namespace: Option<String>,
}

/// Main HTTP client for the experiment-execution API
#[derive(Debug, Clone)]
pub struct ChaosClient {
    http_client: Client,
    base_url: Url,
    config: ClientConfig,
    credentials: Option<Credentials>,
}

impl ChaosClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a new client against an explicit service endpoint
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let mut base_url = Url::parse(base_url)?;
        // action paths are joined relative to a slash-terminated base
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
            config,
            credentials: None,
        })
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an API action
    fn action_url(&self, action: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("api/{action}"))?)
    }

    /// Serialize the request body and attach the namespace, if any.
    fn request_body<B: Serialize>(&self, body: &B) -> Result<Value> {
        let mut value = serde_json::to_value(body)?;
        if let (Some(namespace), Value::Object(map)) = (
            self.credentials
                .as_ref()
                .and_then(|credentials| credentials.namespace.as_ref()),
            &mut value,
        ) {
            map.entry("namespace")
                .or_insert_with(|| Value::String(namespace.clone()));
        }
        Ok(value)
    }

    /// POST a read-only action and unwrap its response envelope, retrying
    /// retryable failures.
    pub(crate) async fn call<B, T>(&self, action: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute(action, body, self.config.max_retries).await
    }

    /// POST an action that changes service state. Sent exactly once: a timed
    /// out request may already have been applied.
    pub(crate) async fn call_once<B, T>(&self, action: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute(action, body, 0).await
    }

    async fn execute<B, T>(&self, action: &str, body: &B, max_retries: u32) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.action_url(action)?;
        let body = self.request_body(body)?;
        let mut attempt: u32 = 0;

        loop {
            match self.send_once(&url, action, &body).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    let delay = err
                        .retry_delay()
                        .map(Duration::from_secs)
                        .unwrap_or(self.config.retry_backoff);
                    warn!(action, attempt, ?delay, error = %err, "request failed; retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, url: &Url, action: &str, body: &Value) -> Result<T> {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = self
            .http_client
            .post(url.clone())
            .header(REQUEST_ID_HEADER, &request_id)
            .json(body);
        if let Some(credentials) = &self.credentials {
            builder = builder.header(
                AUTHORIZATION,
                format!("Bearer {}", credentials.access_token),
            );
        }

        debug!(action, request_id = %request_id, "sending request");
        let response = builder.send().await.map_err(|err| self.map_send_error(err))?;
        self.read_envelope(response).await
    }

    fn map_send_error(&self, err: reqwest::Error) -> ConsoleError {
        if err.is_timeout() {
            ConsoleError::Timeout {
                duration: self.config.timeout.as_secs(),
            }
        } else {
            ConsoleError::Http(err)
        }
    }

    async fn read_envelope<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let text = response.text().await.map_err(|err| self.map_send_error(err))?;
        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
        if !envelope.success {
            return Err(ConsoleError::Api {
                code: envelope.code.unwrap_or_else(|| "Unknown".to_string()),
                message: envelope.message.unwrap_or_default(),
            });
        }

        envelope
            .data
            .ok_or_else(|| ConsoleError::InvalidResponse("response envelope has no data".to_string()))
    }
}

async fn status_error(status: StatusCode, response: Response) -> ConsoleError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let message = response.text().await.unwrap_or_default();
            ConsoleError::Authentication {
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            }
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            ConsoleError::RateLimit { retry_after }
        }
        _ => {
            let message = response.text().await.unwrap_or_default();
            ConsoleError::api_error(status, message)
        }
    }
}
