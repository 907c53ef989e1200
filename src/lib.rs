//! Per-tag serialized request execution.
//!
//! A [`ConnectorRegistry`] hands out one [`Connector`] per tag. Each
//! connector owns a serial [`Executor`] that drains a FIFO queue with a
//! fixed pause between requests, plus a [`Requester`] facade. Executors
//! publish cumulative [`Metrics`] to any number of subscribers and can be
//! stopped at any time without leaving callers blocked.
//!
//! Request execution never returns an error: transport failures, timeouts
//! and rejected input all come back as a [`Response`] with `error` set.
pub mod config;
pub mod connector;
pub mod error;
pub mod executor;
pub mod response;
pub mod transport;

pub use config::{ClientConfig, ExecutorConfig, Settings};
pub use connector::{Connector, ConnectorRegistry, RequestParams, Requester};
pub use executor::{Executor, Metrics, MetricsStream, RequestSpec};
pub use response::Response;
pub use transport::{HttpTransport, Transport, TransportReply};
