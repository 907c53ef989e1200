use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::TransportError;

use super::{OutboundRequest, Transport, TransportReply};

pub(crate) enum StubBehavior {
    Reply { status: u16, body: Bytes },
    Timeout,
    Hang,
}

/// Records every outbound request and answers with a canned behavior.
pub(crate) struct StubTransport {
    behavior: StubBehavior,
    latency: Duration,
    calls: Mutex<Vec<OutboundRequest>>,
}

impl StubTransport {
    pub(crate) fn replying(status: u16, body: &str) -> Self {
        Self::new(StubBehavior::Reply {
            status,
            body: Bytes::copy_from_slice(body.as_bytes()),
        })
    }

    pub(crate) fn timing_out() -> Self {
        Self::new(StubBehavior::Timeout)
    }

    pub(crate) fn hanging() -> Self {
        Self::new(StubBehavior::Hang)
    }

    pub(crate) fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn calls(&self) -> Vec<OutboundRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub(crate) fn call_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.url.to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportReply, TransportError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match &self.behavior {
            StubBehavior::Reply { status, body } => Ok(TransportReply {
                status: *status,
                final_url: request.url.to_string(),
                headers: HashMap::from([(
                    "content-type".to_owned(),
                    "application/json".to_owned(),
                )]),
                body: body.clone(),
            }),
            StubBehavior::Timeout => Err(TransportError::Timeout {
                url: request.url.to_string(),
                timeout: request.timeout,
            }),
            StubBehavior::Hang => std::future::pending().await,
        }
    }
}

pub(crate) fn parse_url(value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|err| format!("Invalid test url '{}': {}", value, err))
}

/// Polls `condition` until it holds or `timeout` elapses.
pub(crate) async fn wait_until<F>(mut condition: F, timeout: Duration) -> Result<(), String>
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now()
        .checked_add(timeout)
        .ok_or_else(|| "Deadline overflow".to_owned())?;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            return Err(format!("Condition not met within {:?}", timeout));
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Ok(())
}
