use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use url::Url;

use crate::config::ExecutorConfig;
use crate::error::ValidationError;
use crate::executor::RequestSpec;

const USER_AGENT: &str = "user-agent";

/// Fully shaped request handed to a [`super::Transport`].
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
    pub timeout: Duration,
}

/// Upper-cases and validates an HTTP method token.
///
/// # Errors
///
/// Returns an error when the method is empty or not a valid token.
pub fn normalize_method(method: &str) -> Result<Method, ValidationError> {
    let normalized = method.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(ValidationError::InvalidMethod {
            value: method.to_owned(),
        });
    }
    Method::from_bytes(normalized.as_bytes()).map_err(|_err| ValidationError::InvalidMethod {
        value: method.to_owned(),
    })
}

/// Methods that never carry a request body on the wire.
#[must_use]
pub fn is_retrieval_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Applies the outbound policy to a request description.
///
/// Empty header names or values are dropped, the configured User-Agent is
/// added unless one was supplied, and the body is omitted for retrieval
/// methods even when the caller supplied one.
///
/// # Errors
///
/// Returns an error when the method is invalid.
pub fn prepare_request(
    request: &RequestSpec,
    config: &ExecutorConfig,
) -> Result<OutboundRequest, ValidationError> {
    let method = normalize_method(&request.method)?;

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect();
    let has_user_agent = headers
        .iter()
        .any(|(key, _)| key.eq_ignore_ascii_case(USER_AGENT));
    if !has_user_agent {
        headers.push(("User-Agent".to_owned(), config.user_agent.clone()));
    }

    let body = if is_retrieval_method(&method) || request.body.is_empty() {
        None
    } else {
        Some(request.body.clone())
    };

    Ok(OutboundRequest {
        method,
        url: request.endpoint.clone(),
        headers,
        body,
        timeout: config.request_timeout,
    })
}
