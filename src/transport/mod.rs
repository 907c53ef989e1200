//! Outbound HTTP exchange: the request policy and the transport seam.
mod http;
mod policy;

#[cfg(test)]
pub(crate) mod test_support;

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;

pub use http::HttpTransport;
pub use policy::{OutboundRequest, is_retrieval_method, normalize_method, prepare_request};

/// Raw result of a completed exchange, before it becomes a `Response`.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    /// URL after any redirects.
    pub final_url: String,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

/// Performs a single request/response exchange.
///
/// Implementations may be shared by any number of executors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportReply, TransportError>;
}
