//! Sending one authenticated request.
//!
//! [`dispatch`] is the primitive every resource call goes through: it builds
//! the headers from the [`ClientConfig`] it is given, performs exactly one
//! round trip, and either returns the untouched body or a classified error.

use crate::{classify, metadata::RequestMetadata, ClientConfig, Error, RawResponse, Result};
use http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Instant;

/// Header carrying the pinned API version.
pub const API_VERSION_HEADER: &str = "shippo-api-version";

/// Builds the headers every request carries.
///
/// # Errors
///
/// Returns an error if the token, version or user agent contain characters
/// that are not valid in a header.
pub fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut authorization = header_value(&config.authorization(), "Authorization")?;
    authorization.set_sensitive(true);
    headers.insert(AUTHORIZATION, authorization);

    headers.insert(USER_AGENT, header_value(config.user_agent(), "User-Agent")?);

    if let Some(version) = config.api_version() {
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            header_value(version, "Shippo-API-Version")?,
        );
    }

    Ok(headers)
}

fn header_value(value: &str, name: &str) -> Result<HeaderValue> {
    HeaderValue::try_from(value)
        .map_err(|e| Error::ConfigurationError(format!("Invalid {} header value: {}", name, e)))
}

/// Sends `request` and returns the raw response or a classified failure.
///
/// Non-2xx bodies are read in full and handed to [`classify`]. There is no
/// retry here.
pub async fn dispatch(
    http_client: &reqwest::Client,
    config: &ClientConfig,
    request: &RequestMetadata,
) -> Result<RawResponse> {
    let url = request.url(config.base_url())?;

    tracing::debug!(
        method = %request.method,
        url = %url,
        has_body = request.body.is_some(),
        "Executing Shippo request"
    );

    let mut builder = http_client
        .request(request.method.clone(), url)
        .headers(default_headers(config)?)
        .timeout(config.timeout());

    if let Some(body) = &request.body {
        builder = builder
            .header(CONTENT_TYPE, "application/json")
            .body(body.clone());
    }

    let start_time = Instant::now();
    let response = builder.send().await.map_err(|e| {
        tracing::warn!(
            error = %e,
            method = %request.method,
            path = %request.path(),
            "Request failed before a response was received"
        );
        Error::Network(e)
    })?;

    let status = response.status();
    let headers = response.headers().clone();

    if !status.is_success() {
        let cause = response.error_for_status_ref().err();
        let raw_response = response.text().await?;
        let latency = start_time.elapsed();

        let error = classify(status, raw_response, cause);
        match &error {
            Error::Api { raw_response, .. } => tracing::error!(
                status = status.as_u16(),
                latency_ms = latency.as_millis(),
                method = %request.method,
                path = %request.path(),
                response = %raw_response,
                "Shippo rejected the request"
            ),
            _ => tracing::warn!(
                status = status.as_u16(),
                latency_ms = latency.as_millis(),
                method = %request.method,
                path = %request.path(),
                "Shippo server error"
            ),
        }
        return Err(error);
    }

    let body = response.text().await?;
    let latency = start_time.elapsed();

    tracing::info!(
        status = status.as_u16(),
        latency_ms = latency.as_millis(),
        method = %request.method,
        path = %request.path(),
        "Received Shippo response"
    );

    Ok(RawResponse {
        status,
        headers,
        body,
        latency,
    })
}
