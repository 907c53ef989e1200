use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, header::HeaderMap, redirect};

use crate::config::ClientConfig;
use crate::error::TransportError;

use super::{OutboundRequest, Transport, TransportReply};

/// `reqwest`-backed transport. Cheap to share; the client pools connections.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut client_builder = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout);

        if config.redirect_limit == 0 {
            client_builder = client_builder.redirect(redirect::Policy::none());
        } else {
            client_builder = client_builder.redirect(redirect::Policy::limited(
                usize::try_from(config.redirect_limit).unwrap_or(10),
            ));
        }

        let client = client_builder
            .build()
            .map_err(|err| TransportError::BuildClient { source: err })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportReply, TransportError> {
        let url = request.url.to_string();
        let timeout = request.timeout;
        let mut request_builder = self
            .client
            .request(request.method, request.url)
            .timeout(timeout);
        for (key, value) in &request.headers {
            request_builder = request_builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            request_builder = request_builder.body(body);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|err| classify_error(err, &url, timeout))?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout {
                    url: url.clone(),
                    timeout,
                }
            } else {
                TransportError::ReadBody {
                    url: url.clone(),
                    source: err,
                }
            }
        })?;

        Ok(TransportReply {
            status,
            final_url,
            headers,
            body,
        })
    }
}

fn classify_error(err: reqwest::Error, url: &str, timeout: std::time::Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_owned(),
            timeout,
        }
    } else if err.is_connect() {
        TransportError::Connect {
            url: url.to_owned(),
            source: err,
        }
    } else {
        TransportError::Request {
            url: url.to_owned(),
            source: err,
        }
    }
}

/// Flattens a header map; repeated names are joined with `", "`.
fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut collected: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        collected
            .entry(name.as_str().to_owned())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_owned());
    }
    collected
}
