use std::collections::HashMap;

use serde::Serialize;

use crate::transport::TransportReply;

/// Outcome of one request, successful or not.
///
/// A populated `error` marks a failure; in that case `body` and
/// `status_code` stay empty. Any HTTP status, including non-2xx, is a
/// successful exchange and is reported as such.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Response {
    pub body: Option<String>,
    pub final_url: Option<String>,
    pub status_code: Option<u16>,
    pub headers: HashMap<String, String>,
    pub error: Option<String>,
}

impl Response {
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_reply(reply: TransportReply) -> Self {
        Self {
            body: String::from_utf8(reply.body.to_vec()).ok(),
            final_url: Some(reply.final_url),
            status_code: Some(reply.status),
            headers: reply.headers,
            error: None,
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Legacy success check: only a plain `200` counts.
    #[must_use]
    pub fn is_ok_status(&self) -> bool {
        self.error.is_none() && self.status_code == Some(200)
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
