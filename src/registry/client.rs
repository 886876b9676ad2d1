//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries)
//! - Rate limit error handling
//! - Bearer tokens attached by host from the run's credentials

use crate::domain::Credentials;
use crate::error::HttpError;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("depbot/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// Longest error body kept in [`HttpError::Status`]
const MAX_ERROR_BODY: usize = 200;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    base_delay: Duration,
}

/// Optional parts of a request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions<'a> {
    pub accept: Option<&'a str>,
    pub body: Option<&'a serde_json::Value>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first backoff delay; later delays double
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Perform a GET request with retry logic
    pub async fn get(&self, url: &str, credentials: &Credentials) -> Result<String, HttpError> {
        self.request(Method::GET, url, credentials, RequestOptions::default())
            .await
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> Result<T, HttpError> {
        let text = self.get(url, credentials).await?;
        parse_json(url, &text)
    }

    /// Send a request with an optional JSON body and parse the JSON response
    ///
    /// An empty response body parses as JSON `null`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
        options: RequestOptions<'_>,
    ) -> Result<T, HttpError> {
        let text = self.request(method, url, credentials, options).await?;
        if text.trim().is_empty() {
            return parse_json(url, "null");
        }
        parse_json(url, &text)
    }

    /// Perform a request with retry logic and return the response body
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
        options: RequestOptions<'_>,
    ) -> Result<String, HttpError> {
        let token = request_host(url).and_then(|host| credentials.token_for_host(&host));
        let mut last_error = None;
        let mut delay = self.base_delay;

        for attempt in 0..=self.max_retries {
            let mut builder = self.client.request(method.clone(), url);
            if let Some(token) = token {
                builder = builder.bearer_auth(token);
            }
            if let Some(accept) = options.accept {
                builder = builder.header(reqwest::header::ACCEPT, accept);
            }
            if let Some(body) = options.body {
                builder = builder.json(body);
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        tracing::debug!(url, attempt, "rate limited");
                        last_error = Some(HttpError::RateLimited {
                            url: url.to_string(),
                        });
                        if attempt < self.max_retries {
                            tokio::time::sleep(delay).await;
                            delay *= 2;
                        }
                        continue;
                    }

                    if status == StatusCode::NOT_FOUND {
                        return Err(HttpError::NotFound {
                            url: url.to_string(),
                        });
                    }

                    let text = response.text().await.map_err(|e| HttpError::InvalidResponse {
                        url: url.to_string(),
                        message: format!("failed to read body: {}", e),
                    })?;

                    if !status.is_success() {
                        return Err(HttpError::Status {
                            status: status.as_u16(),
                            url: url.to_string(),
                            message: truncate(&text, MAX_ERROR_BODY),
                        });
                    }

                    return Ok(text);
                }
                Err(e) => {
                    tracing::debug!(url, attempt, error = %e, "request failed");
                    last_error = Some(if e.is_timeout() {
                        HttpError::Timeout {
                            url: url.to_string(),
                        }
                    } else {
                        HttpError::Network {
                            url: url.to_string(),
                            message: e.to_string(),
                        }
                    });

                    if attempt < self.max_retries {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| HttpError::Network {
            url: url.to_string(),
            message: "unknown error".to_string(),
        }))
    }
}

fn parse_json<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, HttpError> {
    serde_json::from_str(text).map_err(|e| HttpError::InvalidResponse {
        url: url.to_string(),
        message: format!("failed to parse JSON: {}", e),
    })
}

/// Host part of a URL, used to pick the credential to send
fn request_host(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
