use std::collections::HashMap;

use bytes::Bytes;
use tracing::warn;
use url::Url;

use crate::error::ValidationError;
use crate::executor::{Executor, RequestSpec};
use crate::response::Response;

/// Caller-facing request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pub endpoint: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    /// Skip the queue and the inter-job delay.
    pub immediate: bool,
}

impl RequestParams {
    #[must_use]
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new("GET", endpoint)
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub const fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    fn into_spec(self) -> Result<(RequestSpec, bool), ValidationError> {
        let endpoint = Url::parse(self.endpoint.trim()).map_err(|err| {
            ValidationError::InvalidUrl {
                url: self.endpoint.clone(),
                source: err,
            }
        })?;
        let spec = RequestSpec::new(self.method, endpoint)
            .with_headers(self.headers)
            .with_body(Bytes::from(self.body));
        Ok((spec, self.immediate))
    }
}

/// Thin facade over one executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    executor: Executor,
}

impl Requester {
    #[must_use]
    pub const fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Routes the request to the immediate path or the queue.
    ///
    /// A malformed endpoint fails before anything is submitted.
    pub async fn request(&self, params: RequestParams) -> Response {
        let (spec, immediate) = match params.into_spec() {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("{}", err);
                return Response::failure(err.to_string());
            }
        };
        if immediate {
            self.executor.execute_immediate(spec).await
        } else {
            self.executor.enqueue(spec).await
        }
    }

    /// Legacy content path: the body of a `200` response, nothing otherwise.
    pub async fn load_content(&self, params: RequestParams) -> Option<String> {
        let response = self.request(params).await;
        if response.is_ok_status() {
            response.body
        } else {
            None
        }
    }

    /// Detailed path: the full response for any status.
    pub async fn load_detailed(&self, params: RequestParams) -> Response {
        self.request(params).await
    }

    pub fn init_transaction(&self) {
        self.executor.init_transaction();
    }
}
