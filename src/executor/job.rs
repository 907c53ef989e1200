use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::oneshot;
use url::Url;

use crate::response::Response;

/// Immutable description of one outbound request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub endpoint: Url,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl RequestSpec {
    #[must_use]
    pub fn new(method: impl Into<String>, endpoint: Url) -> Self {
        Self {
            endpoint,
            method: method.into(),
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// A queued request plus the slot its caller is waiting on.
pub(crate) struct Job {
    request: RequestSpec,
    epoch: u64,
    slot: oneshot::Sender<Response>,
}

impl Job {
    pub(crate) fn new(request: RequestSpec, epoch: u64) -> (Self, oneshot::Receiver<Response>) {
        let (slot, receiver) = oneshot::channel();
        (
            Self {
                request,
                epoch,
                slot,
            },
            receiver,
        )
    }

    pub(crate) const fn request(&self) -> &RequestSpec {
        &self.request
    }

    /// Transaction epoch the job was submitted in.
    pub(crate) const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Delivers the result. Consumes the job, so a slot resolves at most once.
    pub(crate) fn resolve(self, response: Response) {
        if self.slot.send(response).is_err() {
            tracing::debug!(
                "Caller for {} {} went away before its result arrived",
                self.request.method,
                self.request.endpoint
            );
        }
    }
}
