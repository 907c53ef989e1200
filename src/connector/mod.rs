//! Connectors: one executor plus its requester facade, keyed by tag.
mod registry;
mod requester;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::ExecutorConfig;
use crate::executor::Executor;
use crate::transport::Transport;

pub use registry::ConnectorRegistry;
pub use requester::{RequestParams, Requester};

/// Fixed pairing of an [`Executor`] and the [`Requester`] bound to it.
///
/// Two connectors are equal when they share the same executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    executor: Executor,
    requester: Requester,
}

impl Connector {
    #[must_use]
    pub fn new(config: ExecutorConfig, transport: Arc<dyn Transport>) -> Self {
        let executor = Executor::new(config, transport);
        let requester = Requester::new(executor.clone());
        Self {
            executor,
            requester,
        }
    }

    #[must_use]
    pub const fn executor(&self) -> &Executor {
        &self.executor
    }

    #[must_use]
    pub const fn requester(&self) -> &Requester {
        &self.requester
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.executor.ptr_eq(&other.executor)
    }
}
