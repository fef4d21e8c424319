//! Instrumented Gumroad API client
//!
//! Every outbound request goes through [`UpstreamClient::execute`], which times
//! the call, captures its outcome and appends exactly one [`CallRecord`] to the
//! shared [`CallHistory`], whatever the result.

use crate::config::settings::UpstreamConfig;
use crate::models::gumroad::*;
use crate::models::CallRecord;
use crate::services::history::CallHistory;
use crate::utils::logging::{mask_bearer, truncate_content};
use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Content type of form-encoded request bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Longest body excerpt carried in a status error message
const ERROR_BODY_EXCERPT: usize = 200;

/// Failure of an upstream operation
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// No usable response: malformed URL, connect failure, timeout, broken body
    #[error("{message}")]
    Transport { message: String, timed_out: bool },

    /// Response received with a non-success status
    #[error("API request failed with status {status}: {}", truncate_content(.body, ERROR_BODY_EXCERPT))]
    Status { status: u16, body: String },

    /// Credential rejected by the upstream (HTTP 401)
    #[error("unauthorized - invalid token")]
    InvalidCredential,

    /// Envelope decoded but reported `success: false`
    #[error("API request was not successful")]
    Unsuccessful,

    /// Body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Transport { timed_out: true, .. })
    }
}

/// Which timeout budget a call runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Data fetches and license verification
    Fetch,
    /// Bearer token check
    Credential,
}

/// Raw upstream answer of a call whose transport succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }
}

/// Gumroad API client
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    credential_client: Client,
    base_url: String,
    timeout: Duration,
    credential_timeout: Duration,
    history: Arc<CallHistory>,
}

impl UpstreamClient {
    /// Create a client from upstream settings
    pub fn new(config: &UpstreamConfig, history: Arc<CallHistory>) -> Result<Self> {
        Self::with_timeouts(
            &config.base_url,
            Duration::from_secs(config.timeout),
            Duration::from_secs(config.verify_timeout),
            history,
        )
    }

    /// Create a client with explicit timeouts
    pub fn with_timeouts(
        base_url: &str,
        timeout: Duration,
        credential_timeout: Duration,
        history: Arc<CallHistory>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gumdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let credential_client = Client::builder()
            .timeout(credential_timeout)
            .user_agent(concat!("gumdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create credential check HTTP client")?;

        Ok(Self {
            client,
            credential_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            credential_timeout,
            history,
        })
    }

    /// History this client writes to
    pub fn history(&self) -> &Arc<CallHistory> {
        &self.history
    }

    pub fn products_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    pub fn licenses_url(&self, product_id: &str) -> String {
        format!("{}/products/{}/subscribers", self.base_url, urlencoding::encode(product_id))
    }

    pub fn sales_url(&self, product_id: &str) -> String {
        format!("{}/sales?product_id={}", self.base_url, urlencoding::encode(product_id))
    }

    pub fn verify_url(&self) -> String {
        format!("{}/licenses/verify", self.base_url)
    }

    /// Perform one instrumented call
    ///
    /// Returns the status and body whenever a response was read, whatever the
    /// status; judging the status is up to the caller.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        token: &str,
        kind: CallKind,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let (client, timeout) = match kind {
            CallKind::Fetch => (&self.client, self.timeout),
            CallKind::Credential => (&self.credential_client, self.credential_timeout),
        };

        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), mask_bearer(token));

        let mut request = client
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", token));

        if let Some(body) = &body {
            headers.insert("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string());
            request = request.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body.clone());
        }

        debug!("Sending upstream request: {} {}", method, url);

        let start = Instant::now();
        let outcome = match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(bytes) => Ok(UpstreamResponse {
                        status,
                        body: String::from_utf8_lossy(&bytes).into_owned(),
                    }),
                    Err(e) => Err((status, transport_error(&e, timeout))),
                }
            }
            Err(e) => Err((0, transport_error(&e, timeout))),
        };
        let elapsed = start.elapsed();

        let record = CallRecord::new(method.as_str(), url)
            .with_duration(elapsed)
            .with_request_body(body.unwrap_or_default());
        let record = CallRecord { headers, ..record };

        match outcome {
            Ok(response) => {
                if response.status < 400 {
                    info!(
                        "Upstream call: {} {} - {} in {:.2}ms",
                        method, url, response.status, elapsed.as_secs_f64() * 1000.0
                    );
                } else {
                    warn!(
                        "Upstream call: {} {} - {} in {:.2}ms",
                        method, url, response.status, elapsed.as_secs_f64() * 1000.0
                    );
                }
                self.history.append(
                    record
                        .with_status(response.status)
                        .with_response_body(response.body.clone()),
                );
                Ok(response)
            }
            Err((status, error)) => {
                warn!(
                    "Upstream call failed: {} {} - {} after {:.2}ms",
                    method, url, error, elapsed.as_secs_f64() * 1000.0
                );
                self.history
                    .append(record.with_status(status).with_error(error.to_string()));
                Err(error)
            }
        }
    }

    /// GET `url` and return the body of a 200 response
    pub async fn fetch(&self, url: &str, token: &str) -> Result<String, UpstreamError> {
        let response = self.execute(Method::GET, url, None, token, CallKind::Fetch).await?;
        if !response.is_ok() {
            return Err(UpstreamError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }

    /// List the seller's products
    pub async fn list_products(&self, token: &str) -> Result<Vec<Product>, UpstreamError> {
        let response: ProductsResponse = self.fetch_json(&self.products_url(), token).await?;
        if !response.success {
            return Err(UpstreamError::Unsuccessful);
        }
        Ok(response.products)
    }

    /// List the license records of a product
    pub async fn list_licenses(&self, token: &str, product_id: &str) -> Result<Vec<License>, UpstreamError> {
        let response: LicensesResponse = self.fetch_json(&self.licenses_url(product_id), token).await?;
        if !response.success {
            return Err(UpstreamError::Unsuccessful);
        }
        Ok(response.licenses)
    }

    /// List the sales of a product
    pub async fn list_sales(&self, token: &str, product_id: &str) -> Result<Vec<Sale>, UpstreamError> {
        let response: SalesResponse = self.fetch_json(&self.sales_url(product_id), token).await?;
        if !response.success {
            return Err(UpstreamError::Unsuccessful);
        }
        Ok(response.sales)
    }

    /// Verify a license key without incrementing its use count
    ///
    /// An unknown license is reported in-body, so any status with a JSON body
    /// yields a [`LicenseValidation`].
    pub async fn verify_license(
        &self,
        token: &str,
        product_id: &str,
        license_key: &str,
    ) -> Result<LicenseValidation, UpstreamError> {
        let form = format!(
            "product_id={}&license_key={}&increment_uses_count=false",
            urlencoding::encode(product_id),
            urlencoding::encode(license_key),
        );

        let response = self
            .execute(Method::POST, &self.verify_url(), Some(form), token, CallKind::Fetch)
            .await?;

        let verification: VerifyLicenseResponse = serde_json::from_str(&response.body)?;
        Ok(LicenseValidation::from(verification))
    }

    /// Check that `token` is accepted by the upstream
    pub async fn check_token(&self, token: &str) -> Result<(), UpstreamError> {
        let response = self
            .execute(Method::GET, &self.products_url(), None, token, CallKind::Credential)
            .await?;

        if response.status == StatusCode::UNAUTHORIZED.as_u16() {
            return Err(UpstreamError::InvalidCredential);
        }
        if !response.is_ok() {
            return Err(UpstreamError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T, UpstreamError> {
        let body = self.fetch(url, token).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Describe a reqwest failure including its source chain
fn transport_error(error: &reqwest::Error, timeout: Duration) -> UpstreamError {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = std::error::Error::source(cause);
    }

    if error.is_timeout() {
        UpstreamError::Transport {
            message: format!("request timed out after {:?}: {}", timeout, message),
            timed_out: true,
        }
    } else {
        UpstreamError::Transport {
            message,
            timed_out: false,
        }
    }
}
