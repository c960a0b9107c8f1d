// Availability API client
// One GET per submission against the availability service, no retries

use crate::availability::AvailabilityResult;
use crate::config::ApiConfig;
use crate::form::AvailabilityQuery;
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

pub const CHECK_AVAILABILITY_ACTION: &str = "checkAvailability";

// The end user sees the same message for every API failure
pub const GENERIC_API_ERROR_MESSAGE: &str =
    "在庫確認中にエラーが発生しました。しばらく時間をおいて再度お試しください。";

// Error types for the availability call
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    NetworkFailure(String),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn user_message(&self) -> &'static str {
        GENERIC_API_ERROR_MESSAGE
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Initialization error: {0}")]
    InitError(String),
}

#[async_trait]
pub trait AvailabilityApi: Send + Sync {
    async fn check_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilityResult, ApiError>;
}

// Appends the action tag and the four query fields to the endpoint
pub fn build_query_url(endpoint: &Url, query: &AvailabilityQuery) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("action", CHECK_AVAILABILITY_ACTION)
        .append_pair("pickupBranch", &query.pickup_branch)
        .append_pair("returnBranch", &query.return_branch)
        .append_pair("pickupDateTime", &query.pickup_date_time_param())
        .append_pair("returnDateTime", &query.return_date_time_param());
    url
}

/// Maps a completed HTTP exchange onto the result or the matching error.
pub fn parse_response(status: u16, body: &str) -> Result<AvailabilityResult, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::HttpStatus(status));
    }
    serde_json::from_str(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

pub struct HttpAvailabilityClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpAvailabilityClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|e| ClientError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AvailabilityApi for HttpAvailabilityClient {
    async fn check_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilityResult, ApiError> {
        let url = build_query_url(&self.endpoint, query);
        tracing::debug!(%url, "requesting availability");

        let response = self
            .http
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

        parse_response(status, &body)
    }
}
